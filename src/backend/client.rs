// backend/client.rs

//! HTTP client for the configuration endpoint.

use std::fmt;
use std::time::Duration;

use log::*;
use reqwest::StatusCode;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Path of the configuration resource, relative to the backend endpoint.
pub const CONFIG_PATH: &str = "/api/config";

/// Time after which a configuration request is abandoned.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Payload returned by the configuration endpoint.
///
/// Only `mode` is consumed, any other field is ignored.
/// An absent `mode` is the same as `null`.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigResponse {
    pub mode: Option<String>,
}

// Only a JSON object is a configuration. Derived struct deserializers also
// accept sequences, which would read `["red"]` as a mode.
impl<'de> Deserialize<'de> for ConfigResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ConfigVisitor;

        impl<'de> Visitor<'de> for ConfigVisitor {
            type Value = ConfigResponse;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a configuration object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<ConfigResponse, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut mode: Option<Option<String>> = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "mode" {
                        if mode.is_some() {
                            return Err(serde::de::Error::duplicate_field("mode"));
                        }
                        mode = Some(map.next_value()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(ConfigResponse {
                    mode: mode.flatten(),
                })
            }
        }

        deserializer.deserialize_map(ConfigVisitor)
    }
}

/// Ways a configuration fetch can fail.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid configuration body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fetches the configuration from a single backend.
#[derive(Clone, Debug)]
pub struct ConfigClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl ConfigClient {
    /// Returns a client for the backend at `endpoint`, e.g. `http://localhost:4443`.
    pub fn new(endpoint: &str) -> Self {
        let url = format!("{}{}", endpoint.trim_end_matches('/'), CONFIG_PATH);
        Self {
            http: reqwest::Client::new(),
            url,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the time after which a request is abandoned.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full url of the configuration resource.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issues one `GET` on the configuration resource and decodes the body.
    /// No body, headers or query parameters are sent.
    pub async fn fetch_config(&self) -> Result<ConfigResponse, FetchError> {
        debug!("GET {}", self.url);
        let response = self
            .http
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })?;
        let config = decode_config(&body)?;
        trace!("Received configuration: {:?}", config);
        Ok(config)
    }
}

/// Decodes a configuration body, ignoring unknown fields.
pub fn decode_config(body: &[u8]) -> Result<ConfigResponse, FetchError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use rstest::rstest;
    use tokio::net::TcpListener;

    #[rstest]
    #[case(r#"{"mode": "red"}"#, Some("red"))]
    #[case(r#"{"mode": null}"#, None)]
    #[case(r#"{}"#, None)]
    #[case(r##"{"mode": "#00ff00", "replicas": 3}"##, Some("#00ff00"))]
    #[case(r#"{"replicas": {"min": 1}, "mode": "Blue"}"#, Some("Blue"))]
    #[case(r#"{"mode" : ""}"#, Some(""))]
    fn test_decode_config(#[case] body: &str, #[case] expected: Option<&str>) {
        let config = decode_config(body.as_bytes()).unwrap();
        assert_eq!(config.mode.as_deref(), expected);
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"mode": 42}"#)]
    #[case(r#"["red"]"#)]
    #[case(r#""red""#)]
    #[case("null")]
    #[case(r#"{"mode": "red", "mode": "blue"}"#)]
    fn test_decode_config_rejects_malformed(#[case] body: &str) {
        let err = decode_config(body.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_url_is_built_from_endpoint() {
        let client = ConfigClient::new("http://localhost:4443/");
        assert_eq!(client.url(), "http://localhost:4443/api/config");
        let client = ConfigClient::new("http://10.0.0.1:8080");
        assert_eq!(client.url(), "http://10.0.0.1:8080/api/config");
    }

    #[tokio::test]
    async fn test_fetch_from_closed_port_is_request_error() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ConfigClient::new(&format!("http://{}", addr));
        let err = client.fetch_config().await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }

    #[tokio::test]
    async fn test_hanging_backend_times_out() {
        let router = Router::new().route(
            CONFIG_PATH,
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                r#"{"mode": "red"}"#
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });

        let client = ConfigClient::new(&format!("http://{}", addr))
            .with_timeout(Duration::from_millis(200));
        let err = tokio::time::timeout(Duration::from_secs(5), client.fetch_config())
            .await
            .expect("request is abandoned before the server answers")
            .unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
