//! Client for the authentication core
//!
//! Every recipe operation that needs the service of record goes through a
//! [`Querier`]: a JSON request/response call returning a JSON object. The
//! core signals business outcomes through a `status` field; transport-level
//! problems surface as [`QuerierError`].

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{Map, Value};

use crate::{
    Error,
    config::CoreConfig,
    error::QuerierError,
};

pub type CoreResponse = Map<String, Value>;

/// Status value the core uses for success.
pub const STATUS_OK: &str = "OK";

const API_KEY_HEADER: &str = "api-key";

#[async_trait]
pub trait Querier: Send + Sync {
    async fn send_post_request(&self, path: &str, body: Value) -> Result<CoreResponse, Error>;

    async fn send_get_request(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<CoreResponse, Error>;
}

/// Reads the `status` field of a core response.
pub fn status_of(response: &CoreResponse) -> Option<&str> {
    response.get("status").and_then(Value::as_str)
}

pub fn is_ok(response: &CoreResponse) -> bool {
    status_of(response) == Some(STATUS_OK)
}

/// [`Querier`] over HTTP.
///
/// Hosts are used round-robin. A connection failure moves on to the next host;
/// any answer from a host, including a non-2xx one, is final.
pub struct HttpQuerier {
    client: Client,
    hosts: Vec<Url>,
    api_key: Option<String>,
    next_host: AtomicUsize,
}

impl HttpQuerier {
    pub fn new(config: &CoreConfig) -> Result<Self, Error> {
        let hosts = config.hosts()?;
        if hosts.is_empty() {
            return Err(QuerierError::NoHosts.into());
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| QuerierError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            hosts,
            api_key: config.api_key.clone(),
            next_host: AtomicUsize::new(0),
        })
    }

    fn url_for(host: &Url, path: &str) -> Result<Url, Error> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let base = host.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| QuerierError::Transport(format!("invalid core url: {e}")).into())
    }

    async fn send(
        &self,
        path: &str,
        build: impl Fn(&Client, Url) -> RequestBuilder + Send + Sync,
    ) -> Result<CoreResponse, Error> {
        let start = self.next_host.fetch_add(1, Ordering::Relaxed);
        let mut last_error = QuerierError::NoHosts;

        for offset in 0..self.hosts.len() {
            let host = &self.hosts[(start + offset) % self.hosts.len()];
            let url = Self::url_for(host, path)?;

            let mut request = build(&self.client, url);
            if let Some(api_key) = &self.api_key {
                request = request.header(API_KEY_HEADER, api_key);
            }

            tracing::debug!(core.host = %host, core.path = path, "Sending core request");

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if e.is_connect() => {
                    tracing::warn!(core.host = %host, error = %e, "Core host unreachable, trying next");
                    last_error = QuerierError::Transport(e.to_string());
                    continue;
                }
                Err(e) => return Err(QuerierError::Transport(e.to_string()).into()),
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(core.path = path, status = status.as_u16(), "Core request failed");
                return Err(QuerierError::Status {
                    status: status.as_u16(),
                    body,
                }
                .into());
            }

            return response
                .json::<CoreResponse>()
                .await
                .map_err(|e| QuerierError::Decode(e.to_string()).into());
        }

        Err(last_error.into())
    }
}

#[async_trait]
impl Querier for HttpQuerier {
    async fn send_post_request(&self, path: &str, body: Value) -> Result<CoreResponse, Error> {
        self.send(path, |client, url| client.post(url).json(&body))
            .await
    }

    async fn send_get_request(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<CoreResponse, Error> {
        self.send(path, |client, url| client.get(url).query(query))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_core() -> String {
        let app = Router::new()
            .route(
                "/recipe/dashboard/session/verify",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    let key_ok = headers.get("api-key").is_some_and(|v| v == "secret");
                    let status = if key_ok && body["sessionId"] == "good" {
                        "OK"
                    } else {
                        "INVALID_SESSION_ERROR"
                    };
                    Json(json!({ "status": status }))
                }),
            )
            .route(
                "/recipe/user",
                get(|Query(query): Query<HashMap<String, String>>| async move {
                    Json(json!({ "status": "OK", "echo": query.get("userId") }))
                }),
            )
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "nope") }),
            )
            .route("/garbage", get(|| async { "not json" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn querier(uri: &str) -> HttpQuerier {
        HttpQuerier::new(&CoreConfig::new(uri).with_api_key("secret")).unwrap()
    }

    #[tokio::test]
    async fn test_post_request() {
        let core = spawn_core().await;
        let querier = querier(&core);

        let response = querier
            .send_post_request("/recipe/dashboard/session/verify", json!({"sessionId": "good"}))
            .await
            .unwrap();
        assert!(is_ok(&response));

        let response = querier
            .send_post_request("/recipe/dashboard/session/verify", json!({"sessionId": "bad"}))
            .await
            .unwrap();
        assert_eq!(status_of(&response), Some("INVALID_SESSION_ERROR"));
    }

    #[tokio::test]
    async fn test_get_request_with_query() {
        let core = spawn_core().await;
        let response = querier(&core)
            .send_get_request("recipe/user", &[("userId", "u-1")])
            .await
            .unwrap();
        assert_eq!(response["echo"], "u-1");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let core = spawn_core().await;
        let err = querier(&core)
            .send_get_request("/broken", &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Querier(QuerierError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_is_error() {
        let core = spawn_core().await;
        let err = querier(&core)
            .send_get_request("/garbage", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Querier(QuerierError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fails_over_unreachable_host() {
        let core = spawn_core().await;
        // Nothing listens on port 1 of the loopback interface.
        let querier = querier(&format!("http://127.0.0.1:1;{core}"));

        for _ in 0..2 {
            let response = querier
                .send_get_request("/recipe/user", &[("userId", "u-2")])
                .await
                .unwrap();
            assert!(is_ok(&response));
        }
    }

    #[test]
    fn test_empty_connection_uri() {
        assert!(matches!(
            HttpQuerier::new(&CoreConfig::new(" ; ")),
            Err(Error::Querier(QuerierError::NoHosts))
        ));
    }
}
