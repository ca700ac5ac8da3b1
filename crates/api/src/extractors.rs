//! Request extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use engine_core::RequestContext;

/// Transport metadata for the event being tracked.
///
/// - user agent: `User-Agent`
/// - ip: `CF-Connecting-IP`, else the first `X-Forwarded-For` hop, else `X-Real-IP`
/// - country: `CF-IPCountry`
#[derive(Debug, Clone, Default)]
pub struct ClientContext(pub RequestContext);

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(ip) = header_str(headers, "CF-Connecting-IP") {
        return Some(ip.to_string());
    }

    // Take the first IP in the chain
    if let Some(ip) = header_str(headers, "X-Forwarded-For")
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return Some(ip.to_string());
    }

    header_str(headers, "X-Real-IP").map(str::to_string)
}

impl ClientContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(RequestContext {
            user_agent: header_str(headers, header::USER_AGENT.as_str()).map(str::to_string),
            ip: client_ip(headers),
            country: header_str(headers, "CF-IPCountry").map(str::to_string),
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
