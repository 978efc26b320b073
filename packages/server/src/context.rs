//! Per-request base URI.
//!
//! Links are absolute, so every builder needs to know how the client reached
//! us. Instead of a thread-bound "current request", handlers extract a
//! [`RequestContext`] and pass it explicitly.
//!
//! Header precedence:
//!
//! | Part | Source |
//! |------|--------|
//! | scheme | `X-Forwarded-Proto`, else `http` |
//! | host | `X-Forwarded-Host`, else `Host` |
//! | port | `X-Forwarded-Port` when the host carries none and it is not the scheme default |
//! | path prefix | `X-Forwarded-Prefix` |
//!
//! Without any host header the configured base URI is used.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use crate::config::HypermediaConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    base_uri: String,
}

impl RequestContext {
    /// `base_uri` is stored without a trailing slash.
    pub fn new(base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into();
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_headers(headers: &HeaderMap, fallback: &str) -> Self {
        let Some(host) = first_value(headers, "x-forwarded-host").or_else(|| first_value(headers, "host"))
        else {
            return Self::new(fallback);
        };

        let scheme = first_value(headers, "x-forwarded-proto").unwrap_or_else(|| "http".into());
        let mut authority = host;
        if let Some(port) = first_value(headers, "x-forwarded-port") {
            let default_port = matches!(
                (scheme.as_str(), port.as_str()),
                ("http", "80") | ("https", "443")
            );
            if !has_port(&authority) && !default_port {
                authority = format!("{authority}:{port}");
            }
        }

        let prefix = first_value(headers, "x-forwarded-prefix")
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .map(|p| if p.starts_with('/') { p } else { format!("/{p}") })
            .unwrap_or_default();

        Self::new(format!("{scheme}://{authority}{prefix}"))
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Resolve an absolute path against the base URI.
    pub fn uri_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_uri)
        } else {
            format!("{}/{path}", self.base_uri)
        }
    }
}

fn first_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn has_port(authority: &str) -> bool {
    // IPv6 literals contain colons inside brackets.
    match authority.rfind(']') {
        Some(close) => authority[close..].contains(':'),
        None => authority.contains(':'),
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
    Arc<HypermediaConfig>: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let config = Arc::<HypermediaConfig>::from_ref(state);
        let context = RequestContext::from_headers(&parts.headers, &config.base_uri);
        async move { Ok(context) }
    }
}
