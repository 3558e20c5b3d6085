use std::sync::{Arc, Mutex};

use shared::domain::{User, UserId};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    api::CatalogApi,
    config::ClientConfig,
    error::ClientError,
    feedback::FeedbackTimer,
    lock,
    request::{Generation, GenerationToken, RequestState},
    server_timing::ServerTiming,
    types::LoadedUser,
    Clipboard, Navigator, Route, UserPrompt, ViewEvent,
};

pub const MISSING_BIO: &str = "No bio data available in the secure vault.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Idle,
    Confirming,
    Deleting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Cancelled,
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailSnapshot {
    pub id: Option<UserId>,
    pub request: RequestState<LoadedUser>,
    pub delete: DeleteState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub user: User,
    pub email: String,
    pub bio: String,
    pub latency: String,
    pub deleting: bool,
    pub copied: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Loading,
    NotFound(UserId),
    Profile(Box<ProfileView>),
}

struct DetailState {
    id: Option<UserId>,
    generation: Generation,
    request: RequestState<LoadedUser>,
    delete: DeleteState,
    // Advanced only when the id changes or on teardown, so reloading the same
    // entity keeps an outstanding removal locked in.
    removal: Generation,
}

/// Owns one entity's state: loading it by id and deleting it after an
/// explicit confirmation.
pub struct DetailController {
    api: Arc<dyn CatalogApi>,
    navigator: Arc<dyn Navigator>,
    prompt: Arc<dyn UserPrompt>,
    inner: Mutex<DetailState>,
    events: broadcast::Sender<ViewEvent>,
    copied: FeedbackTimer,
}

impl DetailController {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        navigator: Arc<dyn Navigator>,
        prompt: Arc<dyn UserPrompt>,
        config: &ClientConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            api,
            navigator,
            prompt,
            inner: Mutex::new(DetailState {
                id: None,
                generation: Generation::default(),
                request: RequestState::Idle,
                delete: DeleteState::Idle,
                removal: Generation::default(),
            }),
            copied: FeedbackTimer::new(config.feedback_ttl, events.clone()),
            events,
        }
    }

    pub async fn load(&self, id: UserId) {
        let token = {
            let mut state = lock(&self.inner);
            if state.id.as_ref() != Some(&id) {
                state.removal.advance();
                state.delete = DeleteState::Idle;
            }
            state.id = Some(id.clone());
            state.request = RequestState::Pending;
            state.generation.advance()
        };
        self.notify();

        info!(user_id = %id, "loading user");
        let result = self.api.fetch_user(&id).await;

        {
            let mut state = lock(&self.inner);
            if !state.generation.is_current(token) {
                debug!(user_id = %id, "discarding superseded user response");
                return;
            }
            state.request = match result {
                Ok(loaded) => RequestState::Success(loaded),
                Err(err) => {
                    warn!(user_id = %id, code = ?err.code(), error = %err, "user lookup failed");
                    RequestState::Failure(err)
                }
            };
        }
        self.notify();
    }

    /// Fails with `InvalidState` unless `id` is the loaded entity and no other
    /// removal is underway.
    pub async fn remove(&self, id: &UserId) -> Result<RemoveOutcome, ClientError> {
        let (token, name) = {
            let mut state = lock(&self.inner);
            let name = match state.request.success() {
                Some(loaded) if loaded.user.id == *id => loaded.user.name.clone(),
                _ => return Err(ClientError::InvalidState("no loaded entity to delete")),
            };
            if state.delete != DeleteState::Idle {
                return Err(ClientError::InvalidState("delete already in progress"));
            }
            state.delete = DeleteState::Confirming;
            (state.removal.current(), name)
        };
        self.notify();

        let confirmed = self
            .prompt
            .confirm(&format!("Delete {name} ({id})? This cannot be undone."))
            .await;
        if !confirmed {
            self.settle_delete(token, DeleteState::Idle);
            return Ok(RemoveOutcome::Cancelled);
        }
        self.settle_delete(token, DeleteState::Deleting);

        info!(user_id = %id, "deleting user");
        match self.api.delete_user(id).await {
            Ok(()) => {
                let current = lock(&self.inner).removal.is_current(token);
                if current {
                    self.navigator.navigate(Route::ListRoot);
                } else {
                    debug!(user_id = %id, "delete finished after the view moved on");
                }
                Ok(RemoveOutcome::Removed)
            }
            Err(err) => {
                warn!(user_id = %id, code = ?err.code(), error = %err, "delete failed");
                self.settle_delete(token, DeleteState::Idle);
                self.prompt.alert(&delete_notice(&err)).await;
                Err(err)
            }
        }
    }

    pub fn copy_id(&self, clipboard: &dyn Clipboard) -> bool {
        let Some(id) = lock(&self.inner)
            .request
            .success()
            .map(|loaded| loaded.user.id.clone())
        else {
            return false;
        };
        match clipboard.copy(id.as_str()) {
            Ok(()) => {
                self.copied.trigger();
                true
            }
            Err(reason) => {
                warn!(user_id = %id, %reason, "copy to clipboard failed");
                false
            }
        }
    }

    pub fn copied(&self) -> bool {
        self.copied.is_active()
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        let state = lock(&self.inner);
        DetailSnapshot {
            id: state.id.clone(),
            request: state.request.clone(),
            delete: state.delete,
        }
    }

    pub fn view(&self) -> DetailView {
        let state = lock(&self.inner);
        match (&state.request, &state.id) {
            (RequestState::Success(loaded), _) => {
                let user = loaded.user.clone();
                DetailView::Profile(Box::new(ProfileView {
                    email: user.display_email(),
                    bio: user.bio.clone().unwrap_or_else(|| MISSING_BIO.to_string()),
                    latency: format!("{} ms", loaded.server_latency_ms),
                    deleting: state.delete == DeleteState::Deleting,
                    copied: self.copied.is_active(),
                    user,
                }))
            }
            (RequestState::Failure(_), Some(id)) => DetailView::NotFound(id.clone()),
            _ => DetailView::Loading,
        }
    }

    pub fn timing(&self) -> ServerTiming {
        let state = lock(&self.inner);
        let latency = state
            .request
            .success()
            .map(|loaded| format!("{} ms", loaded.server_latency_ms));
        ServerTiming::new(latency, None)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub fn teardown(&self) {
        {
            let mut state = lock(&self.inner);
            state.generation.advance();
            state.removal.advance();
            state.delete = DeleteState::Idle;
        }
        self.copied.teardown();
    }

    fn settle_delete(&self, token: GenerationToken, delete: DeleteState) {
        {
            let mut state = lock(&self.inner);
            if !state.removal.is_current(token) {
                return;
            }
            state.delete = delete;
        }
        self.notify();
    }

    fn notify(&self) {
        let _ = self.events.send(ViewEvent::DetailChanged);
    }
}

fn delete_notice(err: &ClientError) -> String {
    match err {
        ClientError::ServiceRejected { message, .. } => message.clone(),
        err if err.is_connectivity() => "Error connecting to server".to_string(),
        _ => "Failed to delete user".to_string(),
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
