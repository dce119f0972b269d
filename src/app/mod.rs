// app/mod.rs

//! Controller used to handle user input and interaction with the `Backend` thread.

pub mod actions;
pub mod callbacks;
pub mod state;

use self::state::AppState;
use crate::app::actions::Action;
use crate::backend::app_handler::AppCmdEvent;
use crate::inputs::key::Key;

use crossterm::event::KeyEvent;
use log::*;

/// Return status indicating whether the app should exit or not.
#[derive(Debug, PartialEq, Eq)]
pub enum AppReturn {
    Exit,
    Continue,
}

/// `App` contains the state of the application and a tx channel to the `Backend` thread.
pub struct App {
    app_to_backend_tx: tokio::sync::mpsc::UnboundedSender<AppCmdEvent>,
    pub state: AppState,
}

impl App {
    /// Returns an app with default state and the given channel to the `Backend` thread.
    ///
    /// # Arguments
    ///
    /// * `app_to_backend_tx` - An unbounded channel used to send commands to the `Backend` thread
    pub fn new(app_to_backend_tx: tokio::sync::mpsc::UnboundedSender<AppCmdEvent>) -> Self {
        Self {
            app_to_backend_tx,
            state: AppState::default(),
        }
    }

    /// Mounts the header and asks the backend for its configuration.
    /// The header is displayed right away, without style override.
    pub fn mount_header(&mut self) {
        let token = self.state.header.mount();
        self.dispatch_to_backend(AppCmdEvent::FetchConfig(token));
    }

    /// Unmounts the header. A response still in flight will be dropped.
    pub fn unmount_header(&mut self) {
        self.state.header.unmount();
    }

    /// Process a key event by executing the corresponding action
    pub async fn process_key_event(&mut self, key_event: KeyEvent) -> AppReturn {
        trace!("Keyevent: {:?}", key_event);
        self.do_action(Key::from(key_event))
    }

    /// Handle a user action
    fn do_action(&mut self, key: Key) -> AppReturn {
        if let Some(action) = self.state.actions.find(key) {
            debug!("Run action [{:?}]", action);
            match action {
                Action::Quit => return AppReturn::Exit,
                Action::Reload => {
                    self.unmount_header();
                    self.mount_header();
                }
                Action::ToggleHelp => {
                    self.state.show_help = !self.state.show_help;
                }
                Action::ToggleLogs => {
                    self.state.show_logs = !self.state.show_logs;
                }
            }
        } else {
            warn!("No action associated with {}", key);
        }
        AppReturn::Continue
    }

    /// We could update the app or dispatch event on tick
    pub async fn update_on_tick(&mut self) -> AppReturn {
        AppReturn::Continue
    }

    /// Send a command to the backend thread
    /// Does not block
    pub fn dispatch_to_backend(&self, action: AppCmdEvent) {
        if let Err(e) = self.app_to_backend_tx.send(action) {
            error!("Error from dispatch {}", e);
        };
    }
}
