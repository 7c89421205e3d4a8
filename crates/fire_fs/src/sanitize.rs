//! Filename validation for Windows compatibility

/// Windows reserved filenames
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Windows forbidden characters
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Check if a filename is valid for Windows
pub fn is_valid_filename(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    // Check for forbidden characters
    for c in name.chars() {
        if FORBIDDEN_CHARS.contains(&c) || c.is_control() {
            return false;
        }
    }

    // Check for reserved names
    let name_upper = name.to_uppercase();
    let base_name = name_upper.split('.').next().unwrap_or("");
    if RESERVED_NAMES.contains(&base_name) {
        return false;
    }

    // Check for trailing dots/spaces
    if name.ends_with('.') || name.ends_with(' ') {
        return false;
    }

    true
}

/// Validate a caller-chosen single path component (e.g. a lesson name)
///
/// Returns the trimmed name. Rejects anything that is not a plain, visible,
/// Windows-valid file name: separators, `.`/`..`, leading dots, reserved
/// device names.
pub fn validate_component(name: &str) -> Result<&str, String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("name is empty".to_string());
    }

    if trimmed.starts_with('.') {
        return Err(format!("name must not start with '.': {trimmed}"));
    }

    if !is_valid_filename(trimmed) {
        return Err(format!("not a valid file name: {trimmed}"));
    }

    Ok(trimmed)
}
