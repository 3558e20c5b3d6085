use shared::error::ErrorCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("email is required")]
    MissingEmail,
}

/// Failures a controller can observe. Cloneable so the last failure can be
/// kept inside a [`crate::RequestState`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("catalog API base URL is not configured")]
    ConfigMissing,
    #[error("request could not complete: {0}")]
    Network(String),
    #[error("entity {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("service rejected request: {message}")]
    ServiceRejected {
        status: Option<u16>,
        message: String,
    },
    #[error("operation not allowed: {0}")]
    InvalidState(&'static str),
}

impl ClientError {
    pub fn rejected(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ServiceRejected {
            status,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ConfigMissing => ErrorCode::ConfigMissing,
            Self::Network(_) => ErrorCode::Network,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::Validation,
            Self::ServiceRejected { .. } => ErrorCode::ServiceRejected,
            Self::InvalidState(_) => ErrorCode::InvalidState,
        }
    }

    /// The request never reached a service that could answer it.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ConfigMissing | Self::Network(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}
