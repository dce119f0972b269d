//! Terminal front-end whose header is colored by the `mode` handed out by a
//! configuration backend, and that backend.

pub mod app;
pub mod backend;
pub mod config;
pub mod header;
pub mod inputs;
pub mod logger;
pub mod server;
pub(crate) mod tui;
pub mod ui;

use std::sync::Arc;

use color_eyre::eyre::Result;
use log::*;

use app::{App, AppReturn};
use backend::client::ConfigClient;
use backend::Backend;
use config::ClientConfig;
use inputs::handler::Event;
use tui::Tui;

/// Runs the terminal interface until the user quits.
///
/// The header is mounted before the first frame, so the screen shows up
/// right away and is redrawn with its style once the backend answers.
pub async fn run_view(config: ClientConfig) -> Result<()> {
    let (app_to_backend_tx, app_to_backend_rx) = tokio::sync::mpsc::unbounded_channel();

    // We need to share the App between threads
    let app = Arc::new(tokio::sync::Mutex::new(App::new(app_to_backend_tx)));

    // Handle backend requests in a specific thread
    let backend = Backend::new(ConfigClient::new(&config.endpoint), Arc::clone(&app));
    tokio::spawn(backend.run(app_to_backend_rx));

    let mut tui = Tui::default()?;
    tui.init()?;

    app.lock().await.mount_header();

    loop {
        tui.draw(&mut app.lock().await)?;

        // The lock is not held while waiting, so the backend can call back
        let event = tui.events.next().await;
        let mut app = app.lock().await;
        let result = match event {
            Event::Input(key_event) => app.process_key_event(key_event).await,
            Event::Tick => app.update_on_tick().await,
        };
        if result == AppReturn::Exit {
            app.unmount_header();
            tui.events.close();
            break;
        }
    }

    tui.exit()?;
    debug!("Terminal restored");
    Ok(())
}
