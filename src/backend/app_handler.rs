// backend/app_handler.rs

//! Handles events received from the `App` main thread.
//!
//! Callbacks to the `App` are made via mutex.

use super::Backend;
use crate::header::MountToken;
use color_eyre::eyre::Result;
use log::*;

/// Commands the main `App` can send to the `Backend` thread.
#[derive(Debug)]
pub enum AppCmdEvent {
    /// Fetch the configuration for the header mount holding this token.
    FetchConfig(MountToken),
}

impl Backend {
    /// Handle an `AppCmdEvent` dispatched by the App.
    pub(crate) async fn handle_app_event(&self, app_cmd_event: AppCmdEvent) {
        if let Err(error) = match app_cmd_event {
            AppCmdEvent::FetchConfig(token) => self.do_fetch_config(token).await,
        } {
            error!("Error handling app event: {}", error);
        }
    }

    /// Fetches the configuration and calls back `cb_config_loaded` on app,
    /// unless the header was unmounted in the meantime.
    /// Unmounting aborts a request still in flight.
    async fn do_fetch_config(&self, token: MountToken) -> Result<()> {
        if token.is_cancelled() {
            debug!("Header #{} unmounted before the request was sent", token.id());
            return Ok(());
        }
        let result = tokio::select! {
            result = self.client.fetch_config() => result,
            _ = token.cancelled() => {
                debug!("Header #{} unmounted, request aborted", token.id());
                return Ok(());
            }
        };
        if token.is_cancelled() {
            debug!(
                "Header #{} unmounted while fetching, dropping response",
                token.id()
            );
            return Ok(());
        }
        self.app.lock().await.cb_config_loaded(&token, result);
        Ok(())
    }
}
