//! Gateway error types

use thiserror::Error;

/// Error returned by every gateway call
#[derive(Error, Debug)]
pub enum GatewayError {
    // ===== Rejected before any I/O =====
    #[error("Access denied: {0}")]
    SafetyViolation(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    // ===== Lookup =====
    #[error("Not found: {0}")]
    NotFound(String),

    // ===== Write side (always surfaced, never retried) =====
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl GatewayError {
    /// Caused by the request rather than by the server?
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::SafetyViolation(_)
                | GatewayError::MalformedInput(_)
                | GatewayError::NotFound(_)
        )
    }

    /// HTTP status a routing layer should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::SafetyViolation(_) => 403,
            GatewayError::MalformedInput(_) => 400,
            GatewayError::NotFound(_) => 404,
            GatewayError::Io(_) | GatewayError::Storage(_) => 500,
        }
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::SafetyViolation(_) => "Access denied".to_string(),
            GatewayError::MalformedInput(msg) => format!("Bad request: {}", msg),
            GatewayError::NotFound(what) => format!("Not found: {}", what),
            GatewayError::Io(_) | GatewayError::Storage(_) => {
                "The server could not complete the operation".to_string()
            }
        }
    }
}

impl From<fire_fs::FsError> for GatewayError {
    fn from(e: fire_fs::FsError) -> Self {
        match e {
            fire_fs::FsError::AccessDenied(p) => GatewayError::SafetyViolation(p),
            fire_fs::FsError::NotFound(p) => GatewayError::NotFound(p),
            fire_fs::FsError::InvalidPath(msg) => GatewayError::MalformedInput(msg),
            fire_fs::FsError::Io(e) => GatewayError::Io(e),
        }
    }
}

impl From<fire_store::StoreError> for GatewayError {
    fn from(e: fire_store::StoreError) -> Self {
        use fire_store::StoreError;

        match e {
            StoreError::InvalidKey(msg)
            | StoreError::InvalidValue(msg)
            | StoreError::InvalidName(msg) => GatewayError::MalformedInput(msg),
            StoreError::NotFound(what) => GatewayError::NotFound(what),
            StoreError::Io(e) => GatewayError::Io(e),
            StoreError::Fs(e) => e.into(),
            StoreError::Json(e) => GatewayError::Storage(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let denied: GatewayError = fire_fs::FsError::AccessDenied("x".into()).into();
        assert_eq!(denied.http_status(), 403);
        assert!(denied.is_client_error());

        let bad_name: GatewayError = fire_store::StoreError::InvalidName("..".into()).into();
        assert_eq!(bad_name.http_status(), 400);

        let missing: GatewayError = fire_store::StoreError::NotFound("lesson".into()).into();
        assert_eq!(missing.http_status(), 404);

        let io: GatewayError = std::io::Error::other("disk full").into();
        assert_eq!(io.http_status(), 500);
        assert!(!io.is_client_error());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let denied = GatewayError::SafetyViolation("../../etc".into());
        assert_eq!(denied.user_message(), "Access denied");
    }
}
