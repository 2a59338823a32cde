//! Development reverse proxy for the explorer API
//!
//! Everything under `/api` is forwarded to the upstream origin with the same
//! path and query; responses come back with `Access-Control-Allow-Origin: *`
//! so a browser app on another port can read them.

pub mod cors;
pub mod errors;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use log::{debug, info};
use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;

use crate::config::Config;

pub use cors::CorsConfig;
pub use errors::ProxyError;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Origin requests are forwarded to, e.g. `https://api.main.atgraphite.com`
    pub upstream_url: String,
    pub port: u16,
    pub timeout: Option<Duration>,
    pub cors: CorsConfig,
}

impl ProxyConfig {
    pub fn new(upstream_url: impl Into<String>, port: u16) -> Self {
        Self {
            upstream_url: upstream_url.into(),
            port,
            timeout: None,
            cors: CorsConfig::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.http_timeout,
            ..Self::new(config.upstream_url.clone(), config.proxy_port)
        }
    }

    /// All interfaces on the configured port
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    upstream: Arc<str>,
}

impl ProxyState {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let upstream = config.upstream_url.trim_end_matches('/');
        let invalid = |reason: String| ProxyError::Upstream {
            url: config.upstream_url.clone(),
            reason,
        };
        reqwest::Url::parse(upstream).map_err(|e| invalid(e.to_string()))?;

        // Redirects belong to the browser, not the proxy.
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            upstream: Arc::from(upstream),
        })
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }
}

pub fn router(config: &ProxyConfig) -> Result<Router, ProxyError> {
    let state = ProxyState::new(config)?;

    Ok(Router::new()
        .route("/api", any(forward))
        .route("/api/", any(forward))
        .route("/api/*path", any(forward))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(config.cors.allow_origin_layer())
                .layer(config.cors.cors_layer()),
        )
        .with_state(state))
}

pub async fn serve(config: ProxyConfig) -> Result<(), ProxyError> {
    serve_with_shutdown(config, std::future::pending()).await
}

pub async fn serve_with_shutdown<F>(config: ProxyConfig, shutdown: F) -> Result<(), ProxyError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(&config)?;
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ProxyError::Bind {
            addr,
            reason: e.to_string(),
        })?;

    info!("Proxy server running at http://localhost:{}", config.port);
    info!("Forwarding /api to {}", config.upstream_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ProxyError::Serve(e.to_string()))
}

async fn forward(State(state): State<ProxyState>, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let target = format!("{}{}", host, path);
    let url = format!("{}{}", state.upstream, path);

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ProxyError::Forwarding {
            target: target.clone(),
            reason: e.to_string(),
        })?;

    debug!("{} {} -> {}", parts.method, path, url);
    let upstream = state
        .client
        .request(parts.method, &url)
        .headers(forwarded_headers(&parts.headers))
        .body(body)
        .send()
        .await
        .map_err(|e| ProxyError::from_upstream(target.clone(), e))?;

    let status = upstream.status();
    let headers = forwarded_headers(upstream.headers());
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| ProxyError::from_upstream(target, e))?;
    debug!("{} <- {} ({} bytes)", url, status, bytes.len());

    Ok((status, headers, bytes).into_response())
}

async fn not_found(method: Method, uri: Uri) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("Cannot {} {}", method, uri.path()),
    )
}

/// Headers safe to pass across the proxy: hop-by-hop headers, anything the
/// `Connection` header names, `Host` and `Content-Length` are dropped.
fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    let mut forwarded = headers.clone();
    for name in HOP_BY_HOP
        .iter()
        .chain(listed.iter())
        .chain([header::HOST, header::CONTENT_LENGTH].iter())
    {
        forwarded.remove(name);
    }
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;
    use tower::ServiceExt;

    #[test]
    fn test_from_config() {
        let config = Config {
            upstream_url: "https://api.main.atgraphite.com/".to_string(),
            proxy_port: 4001,
            http_timeout: Some(Duration::from_secs(5)),
            ..Config::default()
        };
        let proxy = ProxyConfig::from_config(&config);
        assert_eq!(proxy.bind_addr(), "0.0.0.0:4001".parse().unwrap());
        assert_eq!(proxy.timeout, Some(Duration::from_secs(5)));

        let state = ProxyState::new(&proxy).unwrap();
        assert_eq!(state.upstream(), "https://api.main.atgraphite.com");
    }

    #[test]
    fn test_invalid_upstream() {
        let err = ProxyState::new(&ProxyConfig::new("not a url", 3001))
            .err()
            .unwrap();
        assert!(matches!(err, ProxyError::Upstream { .. }));
    }

    #[test]
    fn test_hop_by_hop_headers_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3001"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-trace"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-trace", HeaderValue::from_static("1"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let forwarded = forwarded_headers(&headers);
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[header::ACCEPT], "application/json");
    }

    #[tokio::test]
    async fn test_outside_api_is_not_found() {
        let app = router(&ProxyConfig::new("http://127.0.0.1:1", 3001)).unwrap();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
