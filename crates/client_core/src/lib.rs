//! Request orchestration and view-state synchronization for the catalog
//! browser.
//!
//! Every controller owns its state exclusively and reports changes through a
//! `broadcast` channel of [`ViewEvent`]s. Cross-controller effects (refresh
//! after create, navigation after delete) go through the capabilities passed
//! in at construction, never through shared state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use shared::domain::UserId;

pub mod api;
pub mod config;
pub mod detail;
pub mod error;
pub mod feedback;
pub mod list_sync;
pub mod mutation_form;
pub mod request;
pub mod server_timing;
pub mod types;

pub use api::{connect, CatalogApi, HttpCatalogApi, MissingCatalogApi};
pub use config::{ClientConfig, DetailEndpoint};
pub use detail::{DeleteState, DetailController, DetailSnapshot, DetailView, ProfileView, RemoveOutcome};
pub use error::{ClientError, ValidationError};
pub use feedback::FeedbackTimer;
pub use list_sync::{ListRow, ListSnapshot, ListSyncController, ListView, RefreshHook};
pub use mutation_form::{FormFields, FormPhase, MutationFormController};
pub use request::{Generation, GenerationToken, RequestState};
pub use server_timing::{format_latency, ServerTiming};
pub use types::{LoadedUser, MutationOutcome, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    ListChanged,
    DetailChanged,
    FormChanged,
    FeedbackChanged { active: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    ListRoot,
    Detail(UserId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::ListRoot => "/".to_string(),
            Self::Detail(id) => format!("/{id}"),
        }
    }

    pub fn parse(path: &str) -> Self {
        let id = path.trim().trim_matches('/');
        if id.is_empty() {
            Self::ListRoot
        } else {
            Self::Detail(UserId::new(id))
        }
    }
}

/// "Navigate to path P". Implementations must not call back into the
/// controller that asked for the navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Blocking user interaction: yes/no confirmation and notices the user must
/// acknowledge.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
    async fn alert(&self, message: &str);
}

pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), String>;
}

/// Used when the host has no system clipboard; every copy fails.
pub struct MissingClipboard;

impl Clipboard for MissingClipboard {
    fn copy(&self, _text: &str) -> Result<(), String> {
        Err("clipboard is unavailable".to_string())
    }
}

/// Controller state is never held across an await, so a poisoned lock only
/// means another task panicked mid-update; keep serving the last state.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
