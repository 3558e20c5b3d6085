//! Two-phase creation flow: collect name/email, submit, show the stored
//! entity. The surrounding surface stays open until the caller closes it.

use std::sync::{Arc, Mutex};

use shared::domain::NewUser;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    api::CatalogApi,
    error::{ClientError, ValidationError},
    list_sync::RefreshHook,
    lock,
    request::{Generation, GenerationToken},
    server_timing::format_latency,
    types::MutationOutcome,
    Navigator, Route, UserPrompt, ViewEvent,
};

/// Field values exactly as typed. Only the emptiness check trims.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormFields {
    pub name: String,
    pub email: String,
}

impl FormFields {
    pub fn validate(&self) -> Result<NewUser, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        Ok(NewUser {
            name: self.name.clone(),
            email: self.email.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormPhase {
    #[default]
    Closed,
    Input(FormFields),
    Submitting(FormFields),
    ResultShown(MutationOutcome),
}

struct FormState {
    phase: FormPhase,
    /// Bumped on open/close so a submission finishing after the surface was
    /// reopened or closed does not overwrite the new phase.
    generation: Generation,
}

pub struct MutationFormController {
    api: Arc<dyn CatalogApi>,
    navigator: Arc<dyn Navigator>,
    prompt: Arc<dyn UserPrompt>,
    on_created: RefreshHook,
    inner: Mutex<FormState>,
    events: broadcast::Sender<ViewEvent>,
}

impl MutationFormController {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        navigator: Arc<dyn Navigator>,
        prompt: Arc<dyn UserPrompt>,
        on_created: RefreshHook,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            api,
            navigator,
            prompt,
            on_created,
            inner: Mutex::new(FormState {
                phase: FormPhase::Closed,
                generation: Generation::default(),
            }),
            events,
        }
    }

    pub fn open(&self) {
        self.reset(FormPhase::Input(FormFields::default()));
    }

    pub fn close(&self) {
        self.reset(FormPhase::Closed);
    }

    pub fn set_name(&self, name: &str) -> bool {
        self.edit(|fields| fields.name = name.to_string())
    }

    pub fn set_email(&self, email: &str) -> bool {
        self.edit(|fields| fields.email = email.to_string())
    }

    pub fn can_submit(&self) -> bool {
        match &lock(&self.inner).phase {
            FormPhase::Input(fields) => fields.validate().is_ok(),
            _ => false,
        }
    }

    pub async fn submit(&self) -> Result<MutationOutcome, ClientError> {
        let (token, fields, draft) = {
            let mut state = lock(&self.inner);
            let FormPhase::Input(fields) = &state.phase else {
                return Err(ClientError::InvalidState("form is not accepting input"));
            };
            let fields = fields.clone();
            let draft = fields.validate()?;
            state.phase = FormPhase::Submitting(fields.clone());
            (state.generation.current(), fields, draft)
        };
        self.notify();

        info!(name = %draft.name, "creating user");
        match self.api.create_user(&draft).await {
            Ok(outcome) => {
                info!(
                    user_id = %outcome.entity.id,
                    latency_ms = outcome.server_latency_ms,
                    "user created"
                );
                (self.on_created)();
                self.apply(token, FormPhase::ResultShown(outcome.clone()));
                Ok(outcome)
            }
            Err(err) => {
                warn!(code = ?err.code(), error = %err, "create failed");
                self.apply(token, FormPhase::Input(fields));
                self.prompt.alert(&create_notice(&err)).await;
                Err(err)
            }
        }
    }

    pub fn add_another(&self) -> Result<(), ClientError> {
        {
            let mut state = lock(&self.inner);
            if !matches!(state.phase, FormPhase::ResultShown(_)) {
                return Err(ClientError::InvalidState("no result to dismiss"));
            }
            state.phase = FormPhase::Input(FormFields::default());
        }
        self.notify();
        Ok(())
    }

    /// Navigates to the created entity and closes the form.
    pub fn view_created(&self) -> Result<(), ClientError> {
        let id = match &lock(&self.inner).phase {
            FormPhase::ResultShown(outcome) => outcome.entity.id.clone(),
            _ => return Err(ClientError::InvalidState("no created entity to view")),
        };
        self.close();
        self.navigator.navigate(Route::Detail(id));
        Ok(())
    }

    pub fn created_latency(&self) -> Option<String> {
        match &lock(&self.inner).phase {
            FormPhase::ResultShown(outcome) if outcome.server_latency_ms != 0.0 => {
                Some(format_latency(outcome.server_latency_ms))
            }
            _ => None,
        }
    }

    pub fn phase(&self) -> FormPhase {
        lock(&self.inner).phase.clone()
    }

    pub fn is_open(&self) -> bool {
        !matches!(lock(&self.inner).phase, FormPhase::Closed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub fn teardown(&self) {
        lock(&self.inner).generation.advance();
    }

    fn reset(&self, phase: FormPhase) {
        {
            let mut state = lock(&self.inner);
            state.generation.advance();
            state.phase = phase;
        }
        self.notify();
    }

    fn edit(&self, change: impl FnOnce(&mut FormFields)) -> bool {
        {
            let mut state = lock(&self.inner);
            let FormPhase::Input(fields) = &mut state.phase else {
                return false;
            };
            change(fields);
        }
        self.notify();
        true
    }

    fn apply(&self, token: GenerationToken, phase: FormPhase) {
        {
            let mut state = lock(&self.inner);
            if !state.generation.is_current(token) {
                return;
            }
            state.phase = phase;
        }
        self.notify();
    }

    fn notify(&self) {
        let _ = self.events.send(ViewEvent::FormChanged);
    }
}

fn create_notice(err: &ClientError) -> String {
    match err {
        err if err.is_connectivity() => "Error connecting to server".to_string(),
        ClientError::ServiceRejected { message, .. } if !message.is_empty() => {
            format!("Failed to create user: {message}")
        }
        _ => "Failed to create user".to_string(),
    }
}

#[cfg(test)]
#[path = "tests/mutation_form_tests.rs"]
mod tests;
