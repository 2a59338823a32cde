//! CORS handling for the proxy
//!
//! Two layers: a permissive [`tower_http::cors::CorsLayer`] that answers
//! preflights and decorates every route, and a header override that stamps
//! `Access-Control-Allow-Origin` on every response, including whatever the
//! upstream sent.

use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allow_origin: HeaderValue,
    pub allowed_methods: Vec<Method>,
    /// Preflight cache lifetime; browsers pick their own when unset
    pub max_age: Option<Duration>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig {
            allow_origin: HeaderValue::from_static("*"),
            allowed_methods: vec![
                Method::GET,
                Method::HEAD,
                Method::PUT,
                Method::PATCH,
                Method::POST,
                Method::DELETE,
            ],
            max_age: None,
        }
    }
}

impl CorsConfig {
    pub fn is_wildcard(&self) -> bool {
        self.allow_origin.as_bytes() == b"*"
    }

    pub fn cors_layer(&self) -> CorsLayer {
        let origin = if self.is_wildcard() {
            AllowOrigin::any()
        } else {
            AllowOrigin::exact(self.allow_origin.clone())
        };

        let layer = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(self.allowed_methods.clone())
            .allow_headers(AllowHeaders::mirror_request());

        match self.max_age {
            Some(max_age) => layer.max_age(max_age),
            None => layer,
        }
    }

    pub fn allow_origin_layer(&self) -> SetResponseHeaderLayer<HeaderValue> {
        SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allow_origin.clone(),
        )
    }
}
