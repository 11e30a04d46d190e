//! Error types for the bank service client.
//!
//! # Design
//! The bank service answers every failed call with the same envelope it
//! uses for success, so a rejected call is described by its status code and
//! a map of field (or category) names to messages. `ServiceError` carries
//! exactly that. Local failures (transport, encoding, decoding) are
//! surfaced through `ApiError` unchanged; nothing is retried or wrapped.
//!
//! Two errors are considered equal when their field maps are equal. The
//! status code is informational only.

use std::collections::BTreeMap;

use thiserror::Error;

/// Field or category name mapped to its ordered messages, e.g.
/// `{"permission": ["Please ensure you have permission"]}`.
pub type Errors = BTreeMap<String, Vec<String>>;

/// A non-success response from the bank service.
#[derive(Debug, Clone, Default, Error)]
#[error("bank service responded with status {status}: {}", summarize(.errors))]
pub struct ServiceError {
    pub status: u16,
    pub errors: Errors,
}

impl ServiceError {
    pub fn new(status: u16, errors: Errors) -> Self {
        Self { status, errors }
    }

    /// Convenience for the common single-key error map.
    pub fn single(status: u16, key: &str, message: &str) -> Self {
        let mut errors = Errors::new();
        errors.insert(key.to_string(), vec![message.to_string()]);
        Self { status, errors }
    }
}

impl PartialEq for ServiceError {
    fn eq(&self, other: &Self) -> bool {
        self.errors == other.errors
    }
}

impl Eq for ServiceError {}

/// Errors returned by every client operation.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The response body was not a well-formed envelope for the operation.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// The service answered with a status other than the one expected.
    #[error(transparent)]
    Remote(#[from] ServiceError),
}

impl ApiError {
    /// HTTP status of a remote rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote(e) => Some(e.status),
            _ => None,
        }
    }

    /// The error as a field map. Local failures are keyed by stage.
    pub fn errors(&self) -> Errors {
        let (key, message) = match self {
            ApiError::Remote(e) => return e.errors.clone(),
            ApiError::Transport(m) => ("transport", m),
            ApiError::Encoding(m) => ("marshal", m),
            ApiError::Decoding(m) => ("unmarshal", m),
        };
        let mut errors = Errors::new();
        errors.insert(key.to_string(), vec![message.clone()]);
        errors
    }
}

/// Two errors are equal when their `errors()` maps are equal. Local failures
/// compare through their stage-keyed map, so `Transport("x")` equals a
/// `Remote` error whose map is exactly `{"transport": ["x"]}`.
impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.errors() == other.errors()
    }
}

fn summarize(errors: &Errors) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|(key, messages)| format!("{key}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
