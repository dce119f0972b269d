// app/callbacks.rs

//! Callback functions called by the `Backend` thread (under locking)

use super::App;
use crate::backend::client::{ConfigResponse, FetchError};
use crate::header::{ConfigOutcome, MountToken};
use crate::ui::header::warn_if_unpaintable;

impl App {
    /// Hands the configuration fetched for the mount `token` to the header.
    pub(crate) fn cb_config_loaded(
        &mut self,
        token: &MountToken,
        result: Result<ConfigResponse, FetchError>,
    ) -> ConfigOutcome {
        let outcome = self.state.header.on_config_loaded(token, result);
        if outcome == ConfigOutcome::Applied {
            warn_if_unpaintable(self.state.header.style().as_ref());
        }
        outcome
    }
}
