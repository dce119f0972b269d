// logger.rs

//! Logger setup for the terminal UI and for the backend server.

use color_eyre::eyre::{eyre, Result};
use log::LevelFilter;
use std::io::{IsTerminal, Write};
use tui_logger::{init_logger, set_default_level};

/// Targets that are too chatty at debug level.
const QUIET_TARGETS: [&str; 4] = ["hyper_util", "mio", "reqwest::connect", "tower"];

/// Captures logs in memory so they can be shown in the logs panel.
pub fn setup_tui_logger(debug: bool) -> Result<()> {
    init_logger(LevelFilter::Trace).map_err(|e| eyre!("Could not set up logger: {:?}", e))?;
    set_default_level(level(debug));
    for target in QUIET_TARGETS {
        tui_logger::set_level_for_target(target, LevelFilter::Info);
    }
    Ok(())
}

/// Logs to stderr. Lines are JSON objects when stderr is not a terminal,
/// so that log collectors can parse them.
pub fn setup_server_logger(debug: bool) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level(debug));
    for target in QUIET_TARGETS {
        builder.filter_module(target, LevelFilter::Info);
    }
    if json_output() {
        builder.format(|buf, record| {
            let line = serde_json::json!({
                "level": record.level().to_string().to_lowercase(),
                "msg": record.args().to_string(),
                "target": record.target(),
                "time": buf.timestamp().to_string(),
            });
            writeln!(buf, "{}", line)
        });
    }
    builder
        .try_init()
        .map_err(|e| eyre!("Could not set up logger: {}", e))
}

fn level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn json_output() -> bool {
    let dumb_term = std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false);
    dumb_term || !std::io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level() {
        assert_eq!(level(true), LevelFilter::Debug);
        assert_eq!(level(false), LevelFilter::Info);
    }
}
