use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{sync::broadcast, task::JoinHandle, time::Instant};

use crate::{lock, ViewEvent};

#[derive(Default)]
struct SignalState {
    active: bool,
    expires_at: Option<Instant>,
    generation: u64,
    expiry_task: Option<JoinHandle<()>>,
}

/// One-shot expiring signal, e.g. a "copied" confirmation.
///
/// `is_active` is evaluated against the expiry instant, so the answer does not
/// depend on when the expiry task gets scheduled; the task only exists to
/// notify the host that the signal went out.
pub struct FeedbackTimer {
    ttl: Duration,
    inner: Arc<Mutex<SignalState>>,
    events: broadcast::Sender<ViewEvent>,
}

impl FeedbackTimer {
    pub fn new(ttl: Duration, events: broadcast::Sender<ViewEvent>) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(SignalState::default())),
            events,
        }
    }

    /// Activates the signal and (re)starts the expiry delay. Must be called
    /// from within a tokio runtime.
    pub fn trigger(&self) {
        let mut state = lock(&self.inner);
        if let Some(task) = state.expiry_task.take() {
            task.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        state.active = true;
        state.expires_at = Some(Instant::now() + self.ttl);

        let generation = state.generation;
        let ttl = self.ttl;
        let inner = Arc::downgrade(&self.inner);
        let events = self.events.clone();
        state.expiry_task = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            {
                let mut state = lock(&inner);
                if state.generation != generation {
                    return;
                }
                state.active = false;
                state.expiry_task = None;
            }
            let _ = events.send(ViewEvent::FeedbackChanged { active: false });
        }));
        drop(state);

        let _ = self.events.send(ViewEvent::FeedbackChanged { active: true });
    }

    pub fn is_active(&self) -> bool {
        let state = lock(&self.inner);
        state.active && state.expires_at.is_some_and(|at| Instant::now() < at)
    }

    pub fn teardown(&self) {
        let mut state = lock(&self.inner);
        if let Some(task) = state.expiry_task.take() {
            task.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        state.active = false;
        state.expires_at = None;
    }
}

impl Drop for FeedbackTimer {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "tests/feedback_tests.rs"]
mod tests;
