//! Result, error and outcome types for the core library

use serde::Serialize;
use thiserror::Error;

/// Message shown when the backend cannot be reached at all.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Unable to reach the ScamGuard servers. Check your connection and try again.";

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Bad input, rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network unreachable, timeout, broken connection.
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered, but not with success.
    #[error("Server error: {message}")]
    Server { status: Option<u16>, message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a server error
    pub fn server(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: msg.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Text intended for direct display to the user.
    ///
    /// Validation and server messages pass through verbatim; transport
    /// failures collapse to a generic connectivity diagnostic.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Server { message, .. } => message.clone(),
            Error::Transport(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
            Error::Cancelled => "The operation was cancelled".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether repeating the same call might succeed.
    ///
    /// The core never retries on its own; this is for the caller's policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Server {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Uniform success-or-failure value returned at every service boundary.
///
/// Services never surface failures any other way, so callers branch on
/// the variant instead of propagating errors.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    Failure {
        message: String,
        cause: Option<Error>,
    },
}

impl<T> Outcome<T> {
    /// Create a successful outcome
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Create a failed outcome with only a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a failed outcome from an error, keeping it as the cause
    pub fn from_error(error: Error) -> Self {
        Self::Failure {
            message: error.user_message(),
            cause: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Failure message, if this is a failure
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { message, .. } => Some(message.as_str()),
        }
    }

    /// Underlying error, if one was recorded
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Self::Success(_) => None,
            Self::Failure { cause, .. } => cause.as_ref(),
        }
    }

    /// Whether the caller may reasonably retry a failed outcome
    pub fn is_retryable(&self) -> bool {
        self.cause().is_some_and(Error::is_retryable)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure { .. } => None,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure { message, cause } => Outcome::Failure { message, cause },
        }
    }

    /// Convert back into a `Result`, for callers that prefer `?`
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure {
                cause: Some(cause), ..
            } => Err(cause),
            Self::Failure { message, cause: None } => Err(Error::Other(message)),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(e) => Self::from_error(e),
        }
    }
}

/// Serializable view of an outcome (for `--json` output and FFI layers)
#[derive(Debug, Serialize)]
pub struct OutcomeView<'a, T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<T: Serialize> Outcome<T> {
    pub fn view(&self) -> OutcomeView<'_, T> {
        OutcomeView {
            success: self.is_success(),
            data: self.value(),
            error: self.message(),
        }
    }
}
