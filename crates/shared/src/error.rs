use serde::{Deserialize, Serialize};

/// Error classes a client can observe while talking to the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ConfigMissing,
    Network,
    NotFound,
    Validation,
    ServiceRejected,
    InvalidState,
}

/// Rejection body the service attaches to failed mutations,
/// e.g. `{ "success": false, "msg": "locked" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "message", alias = "error")]
    pub msg: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: Some(message.into()),
        }
    }

    /// Message suitable for a user-facing notice, if the service sent one.
    pub fn message(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
    }
}
