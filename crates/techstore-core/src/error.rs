//! Shared error type across TechStore crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed config.
    BadRequest,
    /// Route or record does not exist.
    NotFound,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status code carried by this client code.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => 400,
            ClientCode::NotFound => 404,
            ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TechStoreError>;

/// Unified error type used by core and api.
#[derive(Debug, Error)]
pub enum TechStoreError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl TechStoreError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TechStoreError::BadRequest(_) => ClientCode::BadRequest,
            TechStoreError::NotFound(_) => ClientCode::NotFound,
            TechStoreError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            TechStoreError::Internal(_) => ClientCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_statuses() {
        let err = TechStoreError::NotFound("product 42".into());
        assert_eq!(err.client_code().as_str(), "NOT_FOUND");
        assert_eq!(err.client_code().http_status(), 404);
        assert_eq!(err.to_string(), "not found: product 42");

        let err = TechStoreError::UnsupportedVersion;
        assert_eq!(err.client_code().http_status(), 400);
        assert_eq!(TechStoreError::Internal("x".into()).client_code().http_status(), 500);
    }
}
