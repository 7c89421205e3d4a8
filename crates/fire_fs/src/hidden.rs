//! Hidden-attribute marking for metadata files
//!
//! Metadata files are dot-prefixed, which already hides them everywhere but
//! Windows. On Windows the hidden attribute is set explicitly.

use std::io;
use std::path::Path;

/// Mark a file or directory hidden
#[cfg(windows)]
pub fn mark_hidden(path: &Path) -> io::Result<()> {
    use windows::core::HSTRING;
    use windows::Win32::Storage::FileSystem::{
        GetFileAttributesW, SetFileAttributesW, FILE_ATTRIBUTE_HIDDEN,
        FILE_FLAGS_AND_ATTRIBUTES, INVALID_FILE_ATTRIBUTES,
    };

    let wide = HSTRING::from(path.as_os_str());

    unsafe {
        let current = GetFileAttributesW(&wide);
        if current == INVALID_FILE_ATTRIBUTES {
            return Err(io::Error::last_os_error());
        }
        if current & FILE_ATTRIBUTE_HIDDEN.0 != 0 {
            return Ok(());
        }

        SetFileAttributesW(&wide, FILE_FLAGS_AND_ATTRIBUTES(current | FILE_ATTRIBUTE_HIDDEN.0))
            .map_err(io::Error::other)?;
    }

    tracing::debug!("Marked hidden: {}", path.display());
    Ok(())
}

#[cfg(not(windows))]
pub fn mark_hidden(_path: &Path) -> io::Result<()> {
    Ok(())
}
