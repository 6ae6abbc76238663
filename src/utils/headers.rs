use actix_web::{HttpRequest, HttpResponseBuilder};
use reqwest::RequestBuilder;

/// Determine if a request came from a browser vs an API client
/// Browsers typically send Accept headers that include text/html
#[must_use]
pub fn is_browser_request(req: &HttpRequest) -> bool {
    if let Some(accept) = req.headers().get("accept").and_then(|v| v.to_str().ok()) {
        return accept.contains("text/html") || accept.contains("application/xhtml+xml");
    }

    if let Some(user_agent) = req.headers().get("user-agent").and_then(|v| v.to_str().ok()) {
        let ua_lower = user_agent.to_lowercase();
        return ["mozilla", "chrome", "safari", "firefox", "edge"]
            .iter()
            .any(|marker| ua_lower.contains(marker));
    }

    false
}

/// Token from an `Authorization: Bearer <token>` header
#[must_use]
pub fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get("authorization")?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Check if a header is a hop-by-hop header that should not be forwarded
///
/// Based on RFC 2616 Section 13.5.1
#[must_use]
pub fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Copy browser request headers onto a request for the rendering layer
///
/// Cookies are kept: the rendering layer is first-party and reads the session
/// cookies itself. `Host` is dropped so reqwest sets the upstream host.
pub fn forward_request_headers(req: &HttpRequest, mut builder: RequestBuilder) -> RequestBuilder {
    for (name, value) in req.headers() {
        let name_str = name.as_str();
        if name_str.eq_ignore_ascii_case("host") || is_hop_by_hop_header(name_str) {
            continue;
        }
        if let Ok(value_str) = value.to_str() {
            builder = builder.header(name_str, value_str);
        }
    }
    builder
}

/// Copy upstream response headers onto the client response
pub fn forward_response_headers(
    upstream_response: &reqwest::Response,
    response_builder: &mut HttpResponseBuilder,
) {
    for (name, value) in upstream_response.headers() {
        let name_str = name.as_str();
        if is_hop_by_hop_header(name_str) || name_str.eq_ignore_ascii_case("content-length") {
            continue;
        }
        if let Ok(value_str) = value.to_str() {
            response_builder.append_header((name_str, value_str));
        }
    }
}
