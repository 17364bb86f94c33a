//! Error types for the project features client.
//!
//! # Design
//! `ApiError` is only seen at the sync edges (`build_*`, `Transport`,
//! `ApiResult::decode`). The async facade folds every variant into an
//! `ApiResult::Failure` carrying the `Display` text, so the messages here are
//! what end users eventually read.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, bad URL).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a failure; the message was extracted from the body.
    #[error("{0}")]
    Server(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Deserialization(err.to_string())
    }
}
