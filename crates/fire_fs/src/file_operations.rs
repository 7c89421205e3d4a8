//! File operations module
//! Provides the write primitives behind upload and mkdir

use crate::{FsError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

/// Write a stream to `path`, creating parent directories and truncating any
/// existing file. Returns the number of bytes written.
pub fn write_file<R: Read>(path: &Path, reader: &mut R) -> Result<u64> {
    if path.is_dir() {
        return Err(FsError::InvalidPath(format!(
            "Target is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    let written = io::copy(reader, &mut file)?;
    file.sync_all()?;

    tracing::info!("Wrote {} bytes to {}", written, path.display());
    Ok(written)
}

/// Replace the full contents of `path` with `bytes`
///
/// Opens without `truncate` and shortens afterwards: on Windows, CREATE_ALWAYS
/// fails with access denied when the existing file carries the hidden
/// attribute.
pub fn overwrite_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    file.set_len(0)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Create a directory and any missing parents
pub fn create_dir(path: &Path) -> Result<()> {
    if path.is_file() {
        return Err(FsError::InvalidPath(format!(
            "A file already exists at {}",
            path.display()
        )));
    }

    fs::create_dir_all(path)?;
    tracing::info!("Created directory: {}", path.display());
    Ok(())
}
