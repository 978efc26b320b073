//! JSON error body shared by every HTTP surface built on these formats.

use serde::{Deserialize, Serialize};

use hypermedia::Error;

/// The JSON body returned for all error responses.
///
/// ```json
/// { "error": "no link with rel \"edit\" found", "code": "missing_link" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable description of the problem.
    pub error: String,

    /// Machine-readable error code.
    ///
    /// | `code` | HTTP status |
    /// |--------|------------|
    /// | `invalid_json` | 400 |
    /// | `invalid_document` | 400 |
    /// | `not_found` | 404 |
    /// | `unsupported_media_type` | 415 |
    /// | `affordance_mismatch` | 500 |
    /// | `missing_link` | 500 |
    /// | `empty_embedded_collection` | 500 |
    /// | `internal_error` | 500 |
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        let code = match err {
            Error::AffordanceMismatch { .. } => codes::AFFORDANCE_MISMATCH,
            Error::MissingLink(_) => codes::MISSING_LINK,
            Error::EmptyEmbeddedCollection => codes::EMPTY_EMBEDDED_COLLECTION,
            Error::InvalidDocument(_) => codes::INVALID_DOCUMENT,
            Error::UnsupportedMediaType(_) => codes::UNSUPPORTED_MEDIA_TYPE,
            Error::Json(_) => codes::INVALID_JSON,
        };
        Self::new(code, err.to_string())
    }
}

/// Well-known error codes.
pub mod codes {
    pub const INVALID_JSON: &str = "invalid_json";
    pub const INVALID_DOCUMENT: &str = "invalid_document";
    pub const NOT_FOUND: &str = "not_found";
    pub const UNSUPPORTED_MEDIA_TYPE: &str = "unsupported_media_type";
    pub const AFFORDANCE_MISMATCH: &str = "affordance_mismatch";
    pub const MISSING_LINK: &str = "missing_link";
    pub const EMPTY_EMBEDDED_COLLECTION: &str = "empty_embedded_collection";
    pub const INTERNAL_ERROR: &str = "internal_error";
}
