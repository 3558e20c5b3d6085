//! Paginated list state kept in step with a user-controlled page index.
//! Superseded requests are not cancelled on the wire; their responses are
//! dropped by the generation check.

use std::{
    sync::{Arc, Mutex, PoisonError, Weak},
    time::Duration,
};

use shared::domain::User;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    api::CatalogApi,
    config::ClientConfig,
    error::ClientError,
    lock,
    request::{Generation, GenerationToken, RequestState},
    server_timing::{format_latency, ServerTiming},
    types::Page,
    ViewEvent,
};

pub type RefreshHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    /// 1-based position across pages: `(page - 1) * page_size + i + 1`.
    pub serial: u64,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Entries {
        rows: Vec<ListRow>,
        last_request_failed: bool,
    },
    Empty,
    Failed(ClientError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub page_index: u32,
    pub request: RequestState<Page>,
    pub displayed: Option<Page>,
}

impl ListSnapshot {
    pub fn loading(&self) -> bool {
        self.request.is_pending()
    }
}

struct ListState {
    page_index: u32,
    generation: Generation,
    request: RequestState<Page>,
    displayed: Option<Page>,
    debounce_task: Option<JoinHandle<()>>,
    torn_down: bool,
}

pub struct ListSyncController {
    api: Arc<dyn CatalogApi>,
    page_size: u32,
    debounce: Duration,
    inner: Mutex<ListState>,
    events: broadcast::Sender<ViewEvent>,
    this: Weak<Self>,
}

impl ListSyncController {
    pub fn new(api: Arc<dyn CatalogApi>, config: &ClientConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new_cyclic(|this| Self {
            api,
            page_size: config.page_size.max(1),
            debounce: config.debounce,
            inner: Mutex::new(ListState {
                page_index: 1,
                generation: Generation::default(),
                request: RequestState::Idle,
                displayed: None,
                debounce_task: None,
                torn_down: false,
            }),
            events,
            this: this.clone(),
        })
    }

    pub fn mount(&self) {
        self.update_index(|index| index);
    }

    /// 0 is clamped to 1. Past-the-end pages come back empty.
    pub fn set_page_index(&self, index: u32) {
        self.update_index(|_| index);
    }

    pub fn next_page(&self) {
        self.update_index(|index| index.saturating_add(1));
    }

    /// Returns `false` (and schedules nothing) on the first page or after
    /// teardown.
    pub fn previous_page(&self) -> bool {
        if self.page_index() <= 1 {
            return false;
        }
        self.update_index(|index| index.saturating_sub(1))
    }

    /// Re-fetches the current index immediately, superseding any pending
    /// debounce window.
    pub fn refresh(&self) {
        {
            let mut state = lock(&self.inner);
            if state.torn_down {
                debug!("refresh ignored after teardown");
                return;
            }
            self.schedule(&mut state, None);
        }
        self.notify();
    }

    pub fn refresh_hook(&self) -> RefreshHook {
        let this = self.this.clone();
        Arc::new(move || {
            if let Some(controller) = this.upgrade() {
                controller.refresh();
            }
        })
    }

    /// Final: later index changes and refreshes are ignored.
    pub fn teardown(&self) {
        let mut state = lock(&self.inner);
        state.torn_down = true;
        if let Some(task) = state.debounce_task.take() {
            task.abort();
        }
        state.generation.advance();
        if state.request.is_pending() {
            state.request = RequestState::Idle;
        }
    }

    pub fn page_index(&self) -> u32 {
        lock(&self.inner).page_index
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let state = lock(&self.inner);
        ListSnapshot {
            page_index: state.page_index,
            request: state.request.clone(),
            displayed: state.displayed.clone(),
        }
    }

    pub fn view(&self) -> ListView {
        let state = lock(&self.inner);
        match &state.request {
            RequestState::Idle | RequestState::Pending => ListView::Loading,
            RequestState::Success(page) if page.is_empty() => ListView::Empty,
            RequestState::Success(page) => ListView::Entries {
                rows: self.rows(page),
                last_request_failed: false,
            },
            RequestState::Failure(err) => match &state.displayed {
                Some(page) if !page.is_empty() => ListView::Entries {
                    rows: self.rows(page),
                    last_request_failed: true,
                },
                _ => ListView::Failed(err.clone()),
            },
        }
    }

    pub fn timing(&self) -> ServerTiming {
        let state = lock(&self.inner);
        let latency = state
            .displayed
            .as_ref()
            .map_or(0.0, |page| page.server_latency_ms);
        ServerTiming::new(Some(format_latency(latency)), Some(state.page_index))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    fn rows(&self, page: &Page) -> Vec<ListRow> {
        let offset = u64::from(page.index.saturating_sub(1)) * u64::from(self.page_size);
        page.items
            .iter()
            .zip(1u64..)
            .map(|(user, position)| ListRow {
                serial: offset + position,
                user: user.clone(),
            })
            .collect()
    }

    fn update_index(&self, next: impl FnOnce(u32) -> u32) -> bool {
        {
            let mut state = lock(&self.inner);
            if state.torn_down {
                return false;
            }
            state.page_index = next(state.page_index).max(1);
            self.schedule(&mut state, Some(self.debounce));
        }
        self.notify();
        true
    }

    fn schedule(&self, state: &mut ListState, delay: Option<Duration>) {
        if let Some(task) = state.debounce_task.take() {
            task.abort();
        }
        let token = state.generation.advance();
        let index = state.page_index;
        state.request = RequestState::Pending;

        let this = self.this.clone();
        match delay {
            Some(delay) => {
                debug!(page = index, delay_ms = delay.as_millis() as u64, "page fetch debounced");
                state.debounce_task = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let Some(controller) = this.upgrade() else {
                        return;
                    };
                    if controller.claim_debounce(token) {
                        controller.fetch_and_apply(token, index).await;
                    }
                }));
            }
            None => {
                tokio::spawn(async move {
                    if let Some(controller) = this.upgrade() {
                        controller.fetch_and_apply(token, index).await;
                    }
                });
            }
        }
    }

    // The handle is dropped once the window elapses so later index changes
    // cannot abort the request mid-flight.
    fn claim_debounce(&self, token: GenerationToken) -> bool {
        let mut state = lock(&self.inner);
        if !state.generation.is_current(token) {
            return false;
        }
        state.debounce_task = None;
        true
    }

    async fn fetch_and_apply(&self, token: GenerationToken, index: u32) {
        info!(page = index, "fetching catalog page");
        let result = self.api.fetch_page(index).await;

        {
            let mut state = lock(&self.inner);
            if !state.generation.is_current(token) || state.page_index != index {
                debug!(page = index, "discarding superseded page response");
                return;
            }
            match result {
                Ok(page) => {
                    info!(
                        page = index,
                        items = page.items.len(),
                        latency_ms = page.server_latency_ms,
                        "catalog page applied"
                    );
                    state.displayed = Some(page.clone());
                    state.request = RequestState::Success(page);
                }
                Err(err) => {
                    warn!(page = index, code = ?err.code(), error = %err, "catalog page fetch failed");
                    state.request = RequestState::Failure(err);
                }
            }
        }
        self.notify();
    }

    fn notify(&self) {
        let _ = self.events.send(ViewEvent::ListChanged);
    }
}

impl Drop for ListSyncController {
    fn drop(&mut self) {
        let state = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = state.debounce_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/list_sync_tests.rs"]
mod tests;
