//! Error types for the catalog API client.
//!
//! The API reports failures with bodies of varying shape: a bare JSON string,
//! `{"message": "..."}`, `{"message": ["...", "..."]}`, `{"error": "..."}` or
//! plain text. [`ApiError::from_status`] folds all of them into one optional
//! server message so store logic never inspects raw bodies.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::error::ErrorKind;

/// Longest plain-text body kept as a server message.
const MAX_TEXT_MESSAGE_LEN: usize = 200;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The API rejected the credential (401/403).
    #[error("unauthorized: {}", .message.as_deref().unwrap_or("credential rejected"))]
    Unauthorized {
        /// Message supplied by the server, if any.
        message: Option<String>,
    },

    /// The API is rate limiting this client (429).
    #[error("rate limited by the API")]
    RateLimited {
        /// Message supplied by the server, if any.
        message: Option<String>,
    },

    /// Any other non-success status.
    #[error("API returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message supplied by the server, if any.
        message: Option<String>,
    },

    /// A success response whose body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The API answered a delete without confirming it.
    #[error("deletion was not confirmed: {}", .message.as_deref().unwrap_or("no details"))]
    DeleteNotConfirmed {
        /// Message supplied by the server, if any.
        message: Option<String>,
    },
}

impl ApiError {
    /// Build an error from a non-success status and its raw body.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized { message },
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { message },
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Message supplied by the server, if the failure carried one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::RateLimited { message }
            | Self::Status { message, .. }
            | Self::DeleteNotConfirmed { message } => message.as_deref(),
            Self::Network(_) | Self::MalformedResponse(_) => None,
        }
    }

    /// Taxonomy bucket for this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::Unauthorized { .. } => ErrorKind::AuthorizationFailure,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Status { .. } | Self::DeleteNotConfirmed { .. } => ErrorKind::ServerError,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Structured error bodies the API is known to send.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Text(String),
    Object {
        #[serde(default)]
        message: Option<MessageField>,
        #[serde(default)]
        error: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MessageField {
    One(String),
    Many(Vec<String>),
}

/// Pull a human-readable message out of an error body.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Text(text)) => Some(text),
        Ok(ErrorBody::Object { message, error }) => match message {
            Some(MessageField::One(text)) => Some(text),
            Some(MessageField::Many(parts)) => Some(parts.join("; ")),
            None => error,
        },
        // Other JSON shapes carry nothing we can show
        Err(_) if serde_json::from_str::<serde_json::Value>(body).is_ok() => None,
        Err(_) => Some(body.chars().take(MAX_TEXT_MESSAGE_LEN).collect()),
    };

    message.filter(|m| !m.trim().is_empty())
}
