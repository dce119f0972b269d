// server/mod.rs

//! Backend serving the configuration consumed by the header.
//!
//! Three services run side by side: the configuration service on `port`, a
//! health service on `health_port` and the Prometheus metrics on
//! `metrics_port`. When any of them stops, or on SIGINT/SIGTERM, all are shut
//! down gracefully.

pub mod metrics;
pub mod routes;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use log::*;
use tokio::net::TcpListener;
use tokio::sync::watch;

use self::metrics::{metrics_app, recorder_handle};
use self::routes::{config_app, health_app};

pub const DEFAULT_PORT: u16 = 4443;
pub const DEFAULT_HEALTH_PORT: u16 = 12273;
pub const DEFAULT_METRICS_PORT: u16 = 12274;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0} and {1} cannot be the same")]
    PortConflict(&'static str, &'static str),
    #[error("Invalid address: {0}")]
    Address(String),
    #[error("{service} returned an error: {source}")]
    Io {
        service: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Options of the `serve` command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerOptions {
    pub port: u16,
    pub health_port: u16,
    pub metrics_port: u16,
    pub bind_address: String,
    /// Mode handed out by `/api/config`, `null` when `None`.
    pub mode: Option<String>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            health_port: DEFAULT_HEALTH_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            mode: None,
        }
    }
}

impl ServerOptions {
    /// Checks the options before anything is bound.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.health_port == self.port {
            return Err(ServerError::PortConflict("health-port", "port"));
        }
        if self.metrics_port == self.port {
            return Err(ServerError::PortConflict("metrics-port", "port"));
        }
        if self.metrics_port == self.health_port {
            return Err(ServerError::PortConflict("metrics-port", "health-port"));
        }
        Ok(())
    }

    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        self.socket_addr(self.port)
    }

    pub fn health_addr(&self) -> Result<SocketAddr, ServerError> {
        self.socket_addr(self.health_port)
    }

    pub fn metrics_addr(&self) -> Result<SocketAddr, ServerError> {
        self.socket_addr(self.metrics_port)
    }

    fn socket_addr(&self, port: u16) -> Result<SocketAddr, ServerError> {
        let address = format!("{}:{}", self.bind_address, port);
        address
            .parse()
            .map_err(|e| ServerError::Address(format!("{address}: {e}")))
    }
}

/// Listening sockets of the three services.
pub struct Listeners {
    pub web: TcpListener,
    pub health: TcpListener,
    pub metrics: TcpListener,
}

/// Validates `options`, binds all services and serves until SIGINT/SIGTERM.
pub async fn serve(options: ServerOptions) -> Result<(), ServerError> {
    options.validate()?;
    let listeners = Listeners {
        web: bind(options.addr()?, "web server").await?,
        health: bind(options.health_addr()?, "health service").await?,
        metrics: bind(options.metrics_addr()?, "metrics service").await?,
    };
    serve_on(listeners, options.mode, shutdown_signal()).await
}

async fn bind(addr: SocketAddr, service: &'static str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Io { service, source })
}

/// Serves the configuration, health checks and metrics on `listeners`
/// until `shutdown` completes or one of the services fails.
pub async fn serve_on(
    listeners: Listeners,
    mode: Option<String>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), ServerError> {
    let (stop_tx, stop_rx) = watch::channel(false);

    match &mode {
        Some(mode) => info!("Serving mode {:?}", mode),
        None => info!("No mode configured, serving null"),
    }

    let web_server = run_service(listeners.web, config_app(mode), "web server", &stop_tx);
    let health_server = run_service(listeners.health, health_app(), "health service", &stop_tx);
    let metrics_server = run_service(
        listeners.metrics,
        metrics_app(recorder_handle()),
        "metrics service",
        &stop_tx,
    );

    let watch_shutdown = async {
        tokio::select! {
            _ = shutdown => {
                info!("Shutting down");
                stop_tx.send_replace(true);
            }
            _ = stopped(stop_rx.clone()) => {}
        }
    };

    let (web_result, health_result, metrics_result, ()) =
        tokio::join!(web_server, health_server, metrics_server, watch_shutdown);
    for result in [&web_result, &health_result, &metrics_result] {
        if let Err(e) = result {
            error!("{}", e);
        }
    }
    web_result.and(health_result).and(metrics_result)
}

/// Serves `app` on `listener` until a stop is requested, then asks the
/// other services to stop too.
async fn run_service(
    listener: TcpListener,
    app: Router,
    service: &'static str,
    stop_tx: &watch::Sender<bool>,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Starting {} on http://{}", service, addr);
    }
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(stopped(stop_tx.subscribe()))
    .await
    .map_err(|source| ServerError::Io { service, source });
    stop_tx.send_replace(true);
    result
}

/// Completes once a stop was requested.
async fn stopped(mut stop_rx: watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stop| *stop).await;
}

/// Completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Could not listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Could not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::client::{ConfigClient, ConfigResponse};
    use rstest::rstest;
    use serde_json::Value;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    struct Running {
        web: SocketAddr,
        health: SocketAddr,
        metrics: SocketAddr,
        stop: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
    }

    async fn start(mode: Option<&str>) -> Running {
        let listeners = Listeners {
            web: TcpListener::bind("127.0.0.1:0").await.unwrap(),
            health: TcpListener::bind("127.0.0.1:0").await.unwrap(),
            metrics: TcpListener::bind("127.0.0.1:0").await.unwrap(),
        };
        let web = listeners.web.local_addr().unwrap();
        let health = listeners.health.local_addr().unwrap();
        let metrics = listeners.metrics.local_addr().unwrap();
        let (stop, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(serve_on(listeners, mode.map(String::from), async move {
            let _ = stop_rx.await;
        }));
        Running {
            web,
            health,
            metrics,
            stop,
            task,
        }
    }

    #[rstest]
    #[case(Some("Blue"))]
    #[case(Some(""))]
    #[case(None)]
    #[tokio::test]
    async fn test_serves_configured_mode(#[case] mode: Option<&str>) {
        let running = start(mode).await;
        let client = ConfigClient::new(&format!("http://{}", running.web));
        let config = client.fetch_config().await.unwrap();
        assert_eq!(
            config,
            ConfigResponse {
                mode: mode.map(String::from)
            }
        );

        running.stop.send(()).unwrap();
        running.task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_null_mode_is_explicit_in_body() {
        let running = start(None).await;
        let body: Value = reqwest::get(format!("http://{}/api/config", running.web))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!({ "mode": null }));
        running.stop.send(()).unwrap();
        running.task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_health_service() {
        let running = start(Some("Green")).await;
        let body: Value = reqwest::get(format!("http://{}/health", running.health))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "healthy");

        let response = reqwest::get(format!("http://{}/ready", running.health))
            .await
            .unwrap();
        assert!(response.status().is_success());

        // Health routes are not served on the web port
        let response = reqwest::get(format!("http://{}/health", running.web))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        running.stop.send(()).unwrap();
        running.task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_metrics_service_counts_requests() {
        let running = start(Some("Blue")).await;
        let client = ConfigClient::new(&format!("http://{}", running.web));
        client.fetch_config().await.unwrap();

        let body = reqwest::get(format!("http://{}/metrics", running.metrics))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("http_requests_total"));
        assert!(body.contains(r#"path="/api/config""#));

        // Metrics are only served on their own port
        let response = reqwest::get(format!("http://{}/metrics", running.web))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        running.stop.send(()).unwrap();
        running.task.await.unwrap().unwrap();
    }

    #[rstest]
    #[case(DEFAULT_PORT, DEFAULT_PORT, DEFAULT_METRICS_PORT, ("health-port", "port"))]
    #[case(DEFAULT_PORT, DEFAULT_HEALTH_PORT, DEFAULT_PORT, ("metrics-port", "port"))]
    #[case(DEFAULT_PORT, DEFAULT_HEALTH_PORT, DEFAULT_HEALTH_PORT, ("metrics-port", "health-port"))]
    fn test_port_conflict_is_rejected(
        #[case] port: u16,
        #[case] health_port: u16,
        #[case] metrics_port: u16,
        #[case] expected: (&str, &str),
    ) {
        let options = ServerOptions {
            port,
            health_port,
            metrics_port,
            ..Default::default()
        };
        match options.validate() {
            Err(ServerError::PortConflict(a, b)) => assert_eq!((a, b), expected),
            other => panic!("expected a port conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_default_ports_are_distinct() {
        assert!(ServerOptions::default().validate().is_ok());
    }

    #[tokio::test]
    async fn test_serve_rejects_conflict_before_binding() {
        let options = ServerOptions {
            port: 0,
            health_port: 1,
            metrics_port: 0,
            ..Default::default()
        };
        assert!(matches!(
            serve(options).await,
            Err(ServerError::PortConflict(_, _))
        ));
    }

    #[test]
    fn test_addresses() {
        let options = ServerOptions {
            bind_address: "127.0.0.1".to_string(),
            ..Default::default()
        };
        assert_eq!(options.addr().unwrap(), "127.0.0.1:4443".parse().unwrap());
        assert_eq!(
            options.health_addr().unwrap(),
            "127.0.0.1:12273".parse().unwrap()
        );
        assert_eq!(
            options.metrics_addr().unwrap(),
            "127.0.0.1:12274".parse().unwrap()
        );

        let options = ServerOptions {
            bind_address: "not an ip".to_string(),
            ..Default::default()
        };
        assert!(matches!(options.addr(), Err(ServerError::Address(_))));
    }
}
