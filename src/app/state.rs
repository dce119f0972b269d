// app/state.rs

use super::actions::{Action, Actions};
use crate::header::ConfigAwareHeader;

pub struct AppState {
    // App
    pub actions: Actions,

    // Header
    pub header: ConfigAwareHeader,

    // UI
    pub show_logs: bool,
    pub show_help: bool,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            actions: vec![
                Action::Quit,
                Action::Reload,
                Action::ToggleHelp,
                Action::ToggleLogs,
            ]
            .into(),
            header: ConfigAwareHeader::default(),
            show_logs: false,
            show_help: false,
        }
    }
}
