//! Error types for the signup gateway core.

mod kinds;

pub use kinds::{ApiError, ErrorBody, ErrorDetail, ErrorKind};

use thiserror::Error;

/// Core errors
///
/// `Api` carries the classified, client-visible rejections; the remaining
/// variants wrap causes that are logged in full but surfaced to the client
/// only as a generic kind.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Classified policy/validation/conflict rejection, safe for the client
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Delivery provider failure (email/SMS send or provider-side check)
    #[error("delivery provider failure ({provider}): {message}")]
    Delivery {
        provider: &'static str,
        message: String,
    },

    /// Upstream service failure (chain RPC, captcha backend)
    #[error("upstream service failure ({service}): {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// Record store failure
    #[error("store error: {message}")]
    Store { message: String },

    /// Unexpected internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    pub fn delivery(provider: &'static str, message: impl Into<String>) -> Self {
        CoreError::Delivery {
            provider,
            message: message.into(),
        }
    }

    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        CoreError::Upstream {
            service,
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        CoreError::Store {
            message: message.into(),
        }
    }

    /// HTTP status the boundary layer should answer with
    pub fn status(&self) -> u16 {
        match self {
            CoreError::Api(err) => err.status(),
            _ => 500,
        }
    }

    /// Wire body for this error; non-client causes collapse to generic kinds
    pub fn to_body(&self) -> ErrorBody {
        match self {
            CoreError::Api(err) => err.to_body(),
            CoreError::Delivery { .. } => ErrorBody {
                error: ErrorDetail {
                    kind: "error_api_delivery_failed".to_string(),
                    field: "form".to_string(),
                    status: 500,
                },
            },
            _ => ErrorBody {
                error: ErrorDetail {
                    kind: "error_api_internal".to_string(),
                    field: "form".to_string(),
                    status: 500,
                },
            },
        }
    }

    /// The classified kind, if this is a client-visible rejection
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CoreError::Api(err) => Some(err.kind),
            _ => None,
        }
    }
}

impl From<ErrorKind> for CoreError {
    fn from(kind: ErrorKind) -> Self {
        CoreError::Api(kind.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
