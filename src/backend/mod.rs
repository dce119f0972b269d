// backend/mod.rs

//! Thread talking to the configuration backend on behalf of the `App`.

pub mod app_handler;
pub mod client;

use std::sync::Arc;

use log::*;
use tokio::sync::mpsc::UnboundedReceiver;

use self::app_handler::AppCmdEvent;
use self::client::ConfigClient;
use crate::app::App;

#[derive(Clone)]
pub struct Backend {
    client: ConfigClient,
    app: Arc<tokio::sync::Mutex<App>>,
}

impl Backend {
    /// Returns a backend fetching from `client` and calling back into `app`.
    pub fn new(client: ConfigClient, app: Arc<tokio::sync::Mutex<App>>) -> Self {
        Self { client, app }
    }

    /// Handles commands from the `App` until the sending side is dropped.
    /// Each command runs in its own task so a slow request never delays the next one.
    pub async fn run(self, mut app_to_backend_rx: UnboundedReceiver<AppCmdEvent>) {
        debug!("Backend thread started for {}", self.client.url());
        while let Some(cmd) = app_to_backend_rx.recv().await {
            let backend = self.clone();
            tokio::spawn(async move { backend.handle_app_event(cmd).await });
        }
        debug!("Backend thread stopped");
    }
}
