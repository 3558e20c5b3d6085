use std::sync::Arc;

use async_trait::async_trait;
use client_core::{Clipboard, Navigator, Route, UserPrompt};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, Mutex},
};

/// Stdin lines, shared between the command loop and confirmation prompts.
pub type InputLines = Arc<Mutex<mpsc::Receiver<String>>>;

pub fn spawn_stdin_reader() -> InputLines {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    Arc::new(Mutex::new(rx))
}

pub async fn next_line(input: &InputLines) -> Option<String> {
    input.lock().await.recv().await
}

/// Hands routes to the command loop, which owns screen switching.
pub struct TerminalNavigator {
    routes: mpsc::UnboundedSender<Route>,
}

impl TerminalNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (routes, rx) = mpsc::unbounded_channel();
        (Self { routes }, rx)
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        let _ = self.routes.send(route);
    }
}

pub struct TerminalPrompt {
    input: InputLines,
}

impl TerminalPrompt {
    pub fn new(input: InputLines) -> Self {
        Self { input }
    }
}

#[async_trait]
impl UserPrompt for TerminalPrompt {
    async fn confirm(&self, prompt: &str) -> bool {
        println!("{prompt} [y/N]");
        next_line(&self.input)
            .await
            .is_some_and(|answer| matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    async fn alert(&self, message: &str) {
        println!("!! {message}");
    }
}

pub struct ArboardClipboard;

impl ArboardClipboard {
    /// Fails when no display server or clipboard daemon is reachable.
    pub fn detect() -> Result<Self, arboard::Error> {
        arboard::Clipboard::new()?;
        Ok(Self)
    }
}

impl Clipboard for ArboardClipboard {
    fn copy(&self, text: &str) -> Result<(), String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|err| err.to_string())?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| err.to_string())
    }
}
