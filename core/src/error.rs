//! Error types for the Redmine client core.
//!
//! # Design
//! Wire problems and HTTP problems share one enum because every `parse_*`
//! method can hit either. `FormatError` covers anything the codecs could not
//! interpret once they committed to reading a field; `UnsupportedType` means
//! the requested type has no envelope or codec for the format, which is a
//! usage gap rather than a data problem. Status codes Redmine documents get
//! dedicated variants; everything else lands in `HttpError` with the raw body.

use crate::format::MimeFormat;

/// Errors returned by the codecs and by `RedmineManager` parse methods.
#[derive(Debug, thiserror::Error)]
pub enum RedmineError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401; the API key is missing or invalid.
    #[error("unauthorized: check the API key")]
    Unauthorized,

    /// The server returned 403.
    #[error("forbidden")]
    Forbidden,

    /// The server returned 422 with an errors document.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The server returned a status the operation does not expect.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The payload could not be interpreted: bad XML/JSON, a non-numeric id,
    /// an unparseable date, or an unexpected document shape.
    #[error("malformed payload: {0}")]
    FormatError(String),

    /// No codec or envelope is registered for this type/format pair.
    #[error("{type_name} is not supported in {format} format")]
    UnsupportedType {
        type_name: &'static str,
        format: MimeFormat,
    },

    /// A request payload could not be written.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl RedmineError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        RedmineError::FormatError(message.into())
    }
}

impl From<serde_json::Error> for RedmineError {
    fn from(err: serde_json::Error) -> Self {
        RedmineError::FormatError(format!("invalid JSON: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, RedmineError>;
