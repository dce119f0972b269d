use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Report, Result};
use log::*;

use cool_crazy_app::config::ClientConfig;
use cool_crazy_app::logger::{setup_server_logger, setup_tui_logger};
use cool_crazy_app::run_view;
use cool_crazy_app::server::{
    self, ServerOptions, DEFAULT_BIND_ADDRESS, DEFAULT_HEALTH_PORT, DEFAULT_METRICS_PORT,
    DEFAULT_PORT,
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the application in the terminal (default)
    View(ViewArgs),
    /// Start the configuration server
    Serve(ServeArgs),
}

#[derive(Debug, Default, Args)]
struct ViewArgs {
    /// Base url of the configuration server, overrides the config file
    #[arg(long)]
    url: Option<String>,

    /// Path of the client config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// Port of the configuration service
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Port of the health service
    #[arg(long, env = "HEALTH_PORT", default_value_t = DEFAULT_HEALTH_PORT)]
    health_port: u16,

    /// Port of the Prometheus metrics service
    #[arg(long, env = "METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    metrics_port: u16,

    /// The IP address on which to listen
    #[arg(long, default_value = DEFAULT_BIND_ADDRESS)]
    bind_address: String,

    /// Application mode, handed out verbatim as the header color (any color string)
    #[arg(long, env = "MODE")]
    mode: Option<String>,
}

impl From<ServeArgs> for ServerOptions {
    fn from(args: ServeArgs) -> Self {
        ServerOptions {
            port: args.port,
            health_port: args.health_port,
            metrics_port: args.metrics_port,
            bind_address: args.bind_address,
            mode: args.mode,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::View(ViewArgs::default())) {
        Command::View(args) => {
            setup_tui_logger(cli.debug)?;
            let config = ClientConfig::load(args.config.as_deref())?.with_endpoint(args.url);
            info!("Using configuration server {}", config.endpoint);
            run_view(config).await
        }
        Command::Serve(args) => {
            setup_server_logger(cli.debug)?;
            info!("Starting app");
            server::serve(args.into()).await.map_err(|e| {
                error!("Server stopped: {}", e);
                Report::from(e)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from([
            "cool-crazy-app",
            "--debug",
            "serve",
            "--port",
            "8080",
            "--metrics-port",
            "9090",
            "--mode",
            "Green",
        ])
        .unwrap();
        assert!(cli.debug);
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve command");
        };
        let options = ServerOptions::from(args);
        assert_eq!(options.port, 8080);
        assert_eq!(options.health_port, DEFAULT_HEALTH_PORT);
        assert_eq!(options.metrics_port, 9090);
        assert_eq!(options.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(options.mode.as_deref(), Some("Green"));
    }

    #[test]
    fn test_mode_help_does_not_restrict_values() {
        let help = Cli::command()
            .find_subcommand_mut("serve")
            .unwrap()
            .render_long_help()
            .to_string();
        assert!(help.contains("any color string"));
        assert!(!help.contains("Either Blue or Green"));
    }

    #[test]
    fn test_view_is_default() {
        let cli = Cli::try_parse_from(["cool-crazy-app"]).unwrap();
        assert!(cli.command.is_none());
    }
}
