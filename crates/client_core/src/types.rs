//! Payloads the controllers keep once a request has succeeded.

use shared::domain::User;

/// One page of the catalog as the service returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: u32,
    pub items: Vec<User>,
    pub server_latency_ms: f64,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedUser {
    pub user: User,
    pub server_latency_ms: f64,
}

/// Result of a successful create: the entity as the service stored it.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub entity: User,
    pub server_latency_ms: f64,
}
