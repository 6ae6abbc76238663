//! Page-level access control
//!
//! Pages behind a session bounce to the login page without an `authToken`
//! cookie; the login and signup pages bounce to the landing page with one.
//! API routes and static assets are never gated here.

use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web, Error, HttpResponse,
};

use crate::session::cookie::{extract_cookie_value, AUTH_TOKEN_COOKIE};
use crate::settings::{KnuggetSettings, UiSettings};

const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/summary", "/account"];
const AUTH_PAGES: &[&str] = &["/auth/login", "/auth/signup"];
const ASSET_PREFIXES: &[&str] = &["/_next/static", "/_next/image", "/favicon.ico"];
const ASSET_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".gif", ".png", ".svg", ".webp", ".ico"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Not a gated page
    Skip,
    /// Gated page, request may proceed
    Allow,
    /// Send the browser elsewhere
    Redirect(String),
}

/// Decide what to do with a page request
#[must_use]
pub fn gate_decision(path: &str, has_token: bool, ui: &UiSettings) -> GateDecision {
    if is_ungated(path) {
        return GateDecision::Skip;
    }

    if !has_token && PROTECTED_PREFIXES.iter().any(|prefix| matches_prefix(path, prefix)) {
        return GateDecision::Redirect(ui.login_path.clone());
    }

    if has_token && AUTH_PAGES.contains(&path) {
        return GateDecision::Redirect(ui.landing_path.clone());
    }

    GateDecision::Allow
}

fn is_ungated(path: &str) -> bool {
    path == "/api"
        || path.starts_with("/api/")
        || ASSET_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        || ASSET_EXTENSIONS
            .iter()
            .any(|ext| path.to_ascii_lowercase().ends_with(ext))
}

/// `/summary` and `/summary/abc` match, `/summaryx` does not
fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Middleware applying [`gate_decision`] to every request
///
/// # Errors
///
/// Propagates errors from the wrapped service.
pub async fn route_gate<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let has_token = extract_cookie_value(req.request(), AUTH_TOKEN_COOKIE).is_some();
    let decision = match req.app_data::<web::Data<KnuggetSettings>>() {
        Some(settings) => gate_decision(req.path(), has_token, &settings.ui),
        None => gate_decision(req.path(), has_token, &UiSettings::default()),
    };

    match decision {
        GateDecision::Redirect(location) => {
            log::debug!("Route gate redirecting {} to {location}", req.path());
            let response = HttpResponse::Found()
                .insert_header((header::LOCATION, location))
                .finish();
            Ok(req.into_response(response).map_into_right_body())
        }
        GateDecision::Skip | GateDecision::Allow => {
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
    }
}
