use std::{future::pending, sync::Arc};

use client_core::{
    connect, CatalogApi, ClientConfig, ClientError, Clipboard, DetailController,
    ListSyncController, MissingClipboard, MutationFormController, Navigator, Route, ViewEvent,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::{
    capabilities::{
        next_line, ArboardClipboard, InputLines, TerminalNavigator, TerminalPrompt,
    },
    commands::{self, Command, HELP},
    render,
};

/// Terminal host: owns the list and form controllers for the lifetime of the
/// session and one detail controller per visited profile.
pub struct App {
    config: ClientConfig,
    api: Arc<dyn CatalogApi>,
    navigator: Arc<TerminalNavigator>,
    prompt: Arc<TerminalPrompt>,
    clipboard: Arc<dyn Clipboard>,
    input: InputLines,
    routes: mpsc::UnboundedReceiver<Route>,
    list: Arc<ListSyncController>,
    form: MutationFormController,
    detail: Option<Arc<DetailController>>,
}

impl App {
    pub fn new(config: ClientConfig, input: InputLines) -> Self {
        let api = connect(&config);
        let (navigator, routes) = TerminalNavigator::new();
        let navigator = Arc::new(navigator);
        let prompt = Arc::new(TerminalPrompt::new(input.clone()));
        let list = ListSyncController::new(api.clone(), &config);
        let form = MutationFormController::new(
            api.clone(),
            navigator.clone(),
            prompt.clone(),
            list.refresh_hook(),
        );
        let clipboard: Arc<dyn Clipboard> = match ArboardClipboard::detect() {
            Ok(clipboard) => Arc::new(clipboard),
            Err(err) => {
                warn!(error = %err, "system clipboard unavailable, copy is disabled");
                Arc::new(MissingClipboard)
            }
        };
        Self {
            config,
            api,
            navigator,
            prompt,
            clipboard,
            input,
            routes,
            list,
            form,
            detail: None,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        println!("{HELP}");
        self.list.mount();
        self.render();

        let mut list_events = self.list.subscribe();
        let mut form_events = self.form.subscribe();
        let mut detail_events: Option<broadcast::Receiver<ViewEvent>> = None;

        loop {
            tokio::select! {
                line = next_line(&self.input) => {
                    let Some(line) = line else {
                        info!("input closed");
                        break;
                    };
                    match commands::parse(&line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.handle(command).await,
                        Err(message) => println!("{message}"),
                    }
                }
                Some(route) = self.routes.recv() => {
                    detail_events = self.show(route);
                    self.render();
                }
                event = list_events.recv(), if self.detail.is_none() => {
                    debug!(?event, "list changed");
                    self.render();
                }
                event = form_events.recv(), if self.detail.is_none() => {
                    debug!(?event, "form changed");
                    self.render();
                }
                event = next_event(&mut detail_events) => {
                    debug!(?event, "detail changed");
                    self.render();
                }
            }
        }

        self.list.teardown();
        self.form.teardown();
        if let Some(detail) = self.detail.take() {
            detail.teardown();
        }
        Ok(())
    }

    async fn handle(&mut self, command: Command) {
        if command == Command::Help {
            println!("{HELP}");
            return;
        }
        match self.detail.clone() {
            Some(detail) => self.handle_detail(&detail, command).await,
            None => self.handle_list(command).await,
        }
    }

    async fn handle_list(&mut self, command: Command) {
        let result = match command {
            Command::Next => {
                self.list.next_page();
                Ok(())
            }
            Command::Prev => {
                if !self.list.previous_page() {
                    println!("Already on the first page.");
                }
                Ok(())
            }
            Command::Page(index) => {
                self.list.set_page_index(index);
                Ok(())
            }
            Command::Refresh => {
                self.list.refresh();
                Ok(())
            }
            Command::Open(id) => {
                self.navigator.navigate(Route::parse(&id));
                Ok(())
            }
            Command::New => {
                self.form.open();
                Ok(())
            }
            Command::Name(name) => self.edit(self.form.set_name(&name)),
            Command::Email(email) => self.edit(self.form.set_email(&email)),
            // Service failures are already shown through the prompt.
            Command::Submit => match self.form.submit().await {
                Err(err @ (ClientError::Validation(_) | ClientError::InvalidState(_))) => Err(err),
                _ => Ok(()),
            },
            Command::Another => self.form.add_another(),
            Command::ViewCreated => self.form.view_created(),
            Command::Close => {
                self.form.close();
                Ok(())
            }
            other => {
                println!("{other:?} is only available on a profile.");
                Ok(())
            }
        };
        if let Err(err) = result {
            println!("{err}");
        }
    }

    async fn handle_detail(&mut self, detail: &DetailController, command: Command) {
        match command {
            Command::Back => self.navigator.navigate(Route::ListRoot),
            Command::Refresh => {
                if let Some(id) = detail.snapshot().id {
                    detail.load(id).await;
                }
            }
            Command::Delete => {
                let Some(id) = detail.snapshot().id else {
                    return;
                };
                if let Err(ClientError::InvalidState(reason)) = detail.remove(&id).await {
                    println!("{reason}");
                }
            }
            Command::Copy => {
                if !detail.copy_id(self.clipboard.as_ref()) {
                    println!("Could not copy the id.");
                }
            }
            other => println!("{other:?} is only available on the list."),
        }
    }

    fn edit(&self, applied: bool) -> Result<(), ClientError> {
        if applied {
            Ok(())
        } else {
            Err(ClientError::InvalidState("open the form with `new` first"))
        }
    }

    /// Swaps screens. Returns the event stream of the new detail controller.
    fn show(&mut self, route: Route) -> Option<broadcast::Receiver<ViewEvent>> {
        if let Some(previous) = self.detail.take() {
            previous.teardown();
        }
        info!(path = %route.path(), "navigating");
        match route {
            Route::ListRoot => {
                self.list.refresh();
                None
            }
            Route::Detail(id) => {
                let detail = Arc::new(DetailController::new(
                    self.api.clone(),
                    self.navigator.clone(),
                    self.prompt.clone(),
                    &self.config,
                ));
                let events = detail.subscribe();
                self.detail = Some(detail.clone());
                tokio::spawn(async move { detail.load(id).await });
                Some(events)
            }
        }
    }

    fn render(&self) {
        let screen = match &self.detail {
            Some(detail) => render::detail_screen(&detail.view(), &detail.timing()),
            None => {
                let mut screen = render::list_screen(&self.list.view(), &self.list.timing());
                if let Some(panel) =
                    render::form_panel(&self.form.phase(), self.form.created_latency())
                {
                    screen.push_str("\n\n");
                    screen.push_str(&panel);
                }
                screen
            }
        };
        println!("\n{screen}");
    }
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<ViewEvent>>,
) -> Result<ViewEvent, broadcast::error::RecvError> {
    match events {
        Some(events) => events.recv().await,
        None => pending().await,
    }
}
