//! Scripted collaborators shared by the controller tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::domain::{NewUser, Role, User, UserId};

use crate::{
    api::CatalogApi,
    error::ClientError,
    lock,
    types::{LoadedUser, MutationOutcome, Page},
    Clipboard, Navigator, Route, UserPrompt,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ApiCall {
    FetchPage(u32),
    FetchUser(UserId),
    Create(NewUser),
    Delete(UserId),
}

#[derive(Clone)]
struct Scripted<T> {
    delay: Duration,
    result: Result<T, ClientError>,
}

impl<T> Scripted<T> {
    fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(value),
        }
    }
}

/// In-memory [`CatalogApi`] whose answers (and latencies) are set per test.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    pages: Mutex<HashMap<u32, Scripted<Page>>>,
    users: Mutex<HashMap<UserId, Scripted<LoadedUser>>>,
    creates: Mutex<VecDeque<Scripted<MutationOutcome>>>,
    deletes: Mutex<VecDeque<Scripted<()>>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn page(&self, index: u32, items: Vec<User>, latency: f64) -> &Self {
        self.page_after(index, Duration::ZERO, Ok(items), latency)
    }

    pub(crate) fn page_after(
        &self,
        index: u32,
        delay: Duration,
        items: Result<Vec<User>, ClientError>,
        latency: f64,
    ) -> &Self {
        let result = items.map(|items| Page {
            index,
            items,
            server_latency_ms: latency,
        });
        lock(&self.pages).insert(index, Scripted { delay, result });
        self
    }

    pub(crate) fn user_after(
        &self,
        id: &str,
        delay: Duration,
        result: Result<User, ClientError>,
    ) -> &Self {
        let result = result.map(|user| LoadedUser {
            user,
            server_latency_ms: 0.25,
        });
        lock(&self.users).insert(UserId::new(id), Scripted { delay, result });
        self
    }

    pub(crate) fn user(&self, user: User) -> &Self {
        let id = user.id.as_str().to_string();
        self.user_after(&id, Duration::ZERO, Ok(user))
    }

    pub(crate) fn create_result(&self, result: Result<MutationOutcome, ClientError>) -> &Self {
        self.create_after(Duration::ZERO, result)
    }

    pub(crate) fn create_after(
        &self,
        delay: Duration,
        result: Result<MutationOutcome, ClientError>,
    ) -> &Self {
        lock(&self.creates).push_back(Scripted { delay, result });
        self
    }

    pub(crate) fn delete_after(&self, delay: Duration, result: Result<(), ClientError>) -> &Self {
        lock(&self.deletes).push_back(Scripted { delay, result });
        self
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    pub(crate) fn page_calls(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::FetchPage(index) => Some(index),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        lock(&self.calls).push(call);
    }
}

async fn play<T>(scripted: Scripted<T>) -> Result<T, ClientError> {
    if !scripted.delay.is_zero() {
        tokio::time::sleep(scripted.delay).await;
    }
    scripted.result
}

#[async_trait]
impl CatalogApi for ScriptedApi {
    async fn fetch_page(&self, index: u32) -> Result<Page, ClientError> {
        self.record(ApiCall::FetchPage(index));
        let scripted = lock(&self.pages).get(&index).cloned().unwrap_or_else(|| {
            Scripted::ok(Page {
                index,
                items: Vec::new(),
                server_latency_ms: 0.0,
            })
        });
        play(scripted).await
    }

    async fn fetch_user(&self, id: &UserId) -> Result<LoadedUser, ClientError> {
        self.record(ApiCall::FetchUser(id.clone()));
        let scripted = lock(&self.users).get(id).cloned().unwrap_or(Scripted {
            delay: Duration::ZERO,
            result: Err(ClientError::NotFound(id.to_string())),
        });
        play(scripted).await
    }

    async fn create_user(&self, draft: &NewUser) -> Result<MutationOutcome, ClientError> {
        self.record(ApiCall::Create(draft.clone()));
        let scripted = lock(&self.creates)
            .pop_front()
            .unwrap_or_else(|| Scripted::ok(outcome_for(draft, "created-1")));
        play(scripted).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), ClientError> {
        self.record(ApiCall::Delete(id.clone()));
        let scripted = lock(&self.deletes)
            .pop_front()
            .unwrap_or_else(|| Scripted::ok(()));
        play(scripted).await
    }
}

pub(crate) fn sample_user(id: &str) -> User {
    User {
        id: UserId::new(id),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        role: Role::User,
        bio: None,
    }
}

pub(crate) fn sample_users(prefix: &str, count: usize) -> Vec<User> {
    (1..=count)
        .map(|n| sample_user(&format!("{prefix}-{n}")))
        .collect()
}

pub(crate) fn outcome_for(draft: &NewUser, id: &str) -> MutationOutcome {
    MutationOutcome {
        entity: User {
            id: UserId::new(id),
            name: draft.name.clone(),
            email: draft.email.clone(),
            role: Role::User,
            bio: None,
        },
        server_latency_ms: 0.1234,
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub(crate) fn routes(&self) -> Vec<Route> {
        lock(&self.routes).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        lock(&self.routes).push(route);
    }
}

/// Answers confirmations from a queue (default: yes) and records notices.
#[derive(Default)]
pub(crate) struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    confirm_delay: Mutex<Duration>,
    prompts: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub(crate) fn answering(answers: &[bool]) -> Arc<Self> {
        let prompt = Self::default();
        lock(&prompt.answers).extend(answers.iter().copied());
        Arc::new(prompt)
    }

    pub(crate) fn confirming_after(delay: Duration) -> Arc<Self> {
        let prompt = Self::default();
        *lock(&prompt.confirm_delay) = delay;
        Arc::new(prompt)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub(crate) fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn confirm(&self, prompt: &str) -> bool {
        lock(&self.prompts).push(prompt.to_string());
        let delay = *lock(&self.confirm_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        lock(&self.answers).pop_front().unwrap_or(true)
    }

    async fn alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }
}

#[derive(Default)]
pub(crate) struct RecordingClipboard {
    fail: bool,
    copied: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn copied(&self) -> Vec<String> {
        lock(&self.copied).clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn copy(&self, text: &str) -> Result<(), String> {
        if self.fail {
            return Err("no display".to_string());
        }
        lock(&self.copied).push(text.to_string());
        Ok(())
    }
}

/// Counts invocations of a refresh hook.
#[derive(Default)]
pub(crate) struct RefreshCounter(AtomicUsize);

impl RefreshCounter {
    pub(crate) fn hook(self: &Arc<Self>) -> crate::RefreshHook {
        let counter = Arc::clone(self);
        Arc::new(move || {
            counter.0.fetch_add(1, Ordering::SeqCst);
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lets spawned controller tasks run to their next suspension point.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
