//! The uniform `{success, data | error}` result returned by every call.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Keys searched, in order, for a human-readable failure message.
pub const ERROR_MESSAGE_KEYS: [&str; 3] = ["error", "detail", "message"];

/// Fallback message for faults that carry no text of their own.
pub const GENERIC_FAILURE: &str = "An error occurred";

/// Outcome of one request. Callers branch on the variant (or
/// [`ApiResult::is_success`]); nothing is ever raised past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Envelope", try_from = "Envelope")]
pub enum ApiResult {
    Success { data: Value },
    Failure { error: String },
}

impl ApiResult {
    pub fn success(data: Value) -> Self {
        ApiResult::Success { data }
    }

    /// Success with an empty JSON object as the payload.
    pub fn empty() -> Self {
        ApiResult::Success {
            data: Value::Object(Map::new()),
        }
    }

    /// Failure with `message`, or [`GENERIC_FAILURE`] when it is empty.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let error = if message.is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        };
        ApiResult::Failure { error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResult::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiResult::Success { data } => Some(data),
            ApiResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResult::Success { .. } => None,
            ApiResult::Failure { error } => Some(error),
        }
    }

    /// Deserialize the success payload into `T`.
    ///
    /// A failure result becomes `ApiError::Server` with its message.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ApiResult::Success { data } => Ok(serde_json::from_value(data)?),
            ApiResult::Failure { error } => Err(ApiError::Server(error)),
        }
    }
}

impl From<ApiError> for ApiResult {
    fn from(err: ApiError) -> Self {
        ApiResult::failure(err.to_string())
    }
}

/// First non-empty string among [`ERROR_MESSAGE_KEYS`] in `payload`.
///
/// Anything else in those slots (null, numbers, empty strings, nested
/// validation lists) is skipped.
pub fn extract_error_message(payload: &Value) -> Option<String> {
    ERROR_MESSAGE_KEYS.iter().find_map(|key| match payload.get(*key) {
        Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
        _ => None,
    })
}

/// Wire form of [`ApiResult`].
#[derive(Serialize, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ApiResult> for Envelope {
    fn from(result: ApiResult) -> Self {
        match result {
            ApiResult::Success { data } => Envelope {
                success: true,
                data: Some(data),
                error: None,
            },
            ApiResult::Failure { error } => Envelope {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<Envelope> for ApiResult {
    type Error = String;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        match (envelope.success, envelope.error) {
            (true, _) => Ok(ApiResult::Success {
                data: envelope.data.unwrap_or_else(|| Value::Object(Map::new())),
            }),
            (false, Some(error)) => Ok(ApiResult::Failure { error }),
            (false, None) => Err("failure result without an error message".to_string()),
        }
    }
}
