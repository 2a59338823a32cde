//! Proxy failures and how they reach the browser

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::warn;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Upstream refused the connection or did not answer in time
    #[error("Error occurred while trying to proxy: {target}")]
    GatewayTimeout { target: String, reason: String },
    #[error("Error occurred while trying to proxy: {target}")]
    Forwarding { target: String, reason: String },
    #[error("invalid upstream url {url}: {reason}")]
    Upstream { url: String, reason: String },
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },
    #[error("proxy server stopped: {0}")]
    Serve(String),
}

impl ProxyError {
    /// Classify a failed upstream exchange. `target` is the browser-facing
    /// `{host}{path}`.
    pub(crate) fn from_upstream(target: String, err: reqwest::Error) -> Self {
        let reason = err.to_string();
        if err.is_connect() || err.is_timeout() {
            ProxyError::GatewayTimeout { target, reason }
        } else {
            ProxyError::Forwarding { target, reason }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::GatewayTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn reason(&self) -> Option<&str> {
        match self {
            ProxyError::GatewayTimeout { reason, .. } | ProxyError::Forwarding { reason, .. } => {
                Some(reason)
            }
            _ => None,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Some(reason) = self.reason() {
            warn!("{} ({}): {}", self, status, reason);
        }
        (status, self.to_string()).into_response()
    }
}
