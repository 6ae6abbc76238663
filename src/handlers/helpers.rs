// Helpers shared by the API handlers
use actix_web::{HttpRequest, HttpResponse, ResponseError};

use crate::auth::FlowError;
use crate::backend::BackendError;
use crate::session::{CookieFactory, CookieSessionStore, SessionStore};
use crate::settings::KnuggetSettings;
use crate::utils::headers::extract_bearer_token;
use crate::utils::logging::LoggingHelper;
use crate::utils::responses::ResponseBuilder;

/// Session store for this request, seeded from its cookies
#[must_use]
pub fn session_store(req: &HttpRequest, settings: &KnuggetSettings) -> CookieSessionStore {
    CookieSessionStore::from_request(req, CookieFactory::for_request(req, &settings.cookies))
}

/// Access token from the session cookie, else from a bearer header
#[must_use]
pub fn access_token(req: &HttpRequest, store: &CookieSessionStore) -> Option<String> {
    store.read().or_else(|| extract_bearer_token(req))
}

/// Render a backend failure; a 401 also ends the browser session
#[must_use]
pub fn backend_failure(
    req: &HttpRequest,
    error: BackendError,
    store: &mut CookieSessionStore,
) -> HttpResponse {
    if error.is_unauthorized() {
        LoggingHelper::log_session_invalidated(req.path());
        store.clear();
        return ResponseBuilder::unauthorized()
            .with_message(&error.to_string())
            .with_cookies(store.delta())
            .build();
    }
    flow_failure(req, FlowError::from(error), store)
}

/// Render a flow failure, carrying any cookie changes already made
#[must_use]
pub fn flow_failure(req: &HttpRequest, error: FlowError, store: &CookieSessionStore) -> HttpResponse {
    LoggingHelper::log_flow_failure(req.path(), &error.to_string());
    ResponseBuilder::error(error.status_code())
        .with_error_code(error.code())
        .with_message(&error.to_string())
        .with_cookies(store.delta())
        .build()
}
