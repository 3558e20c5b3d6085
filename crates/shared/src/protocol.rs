use serde::{Deserialize, Serialize};

use crate::domain::User;

/// `GET /users/page/{n}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub time_taken: f64,
}

/// `GET /{id}` or `GET /users/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default)]
    pub time_ms: f64,
}

/// `POST /users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: User,
    #[serde(default)]
    pub time_taken: f64,
}

/// `DELETE /users/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}
