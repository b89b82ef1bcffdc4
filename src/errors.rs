// errors.rs
use std::fmt;

/// Errors originating from the remote collaborators
/// (listings endpoint, geocoding service).
#[derive(Debug)]
pub enum ApiError {
    Network(String),
    Status(u16, String),
    JsonParse(String),
    UnexpectedShape(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {msg}"),
            ApiError::Status(code, body) => write!(f, "HTTP {code}: {body}"),
            ApiError::JsonParse(msg) => write!(f, "JSON parse error: {msg}"),
            ApiError::UnexpectedShape(msg) => write!(f, "Unexpected data shape: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Errors from the local sqlite state store.
#[derive(Debug)]
pub enum StateError {
    Db(String),
    Encode(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Db(msg) => write!(f, "Database error: {msg}"),
            StateError::Encode(msg) => write!(f, "Encode error: {msg}"),
        }
    }
}

impl std::error::Error for StateError {}
