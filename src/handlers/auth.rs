use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::json;

use super::helpers::{access_token, backend_failure, flow_failure, session_store};
use crate::auth::{Completion, CredentialFlow, FlowError, FlowOrigin, FlowResult, OriginQuery};
use crate::backend::BackendClient;
use crate::handoff::HandoffOutcome;
use crate::models::{RefreshRequest, Session, SessionUser, SignInRequest, SignUpRequest};
use crate::session::{CookieSessionStore, SessionStore};
use crate::settings::KnuggetSettings;
use crate::utils::headers::is_browser_request;
use crate::utils::responses::ResponseBuilder;

/// Body returned after a session was established
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse<'a> {
    success: bool,
    user: &'a SessionUser,
    token: &'a str,
    /// Epoch milliseconds
    expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    completion: Option<&'a Completion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    handoff: Option<&'a HandoffOutcome>,
}

impl<'a> SessionResponse<'a> {
    fn new(session: &'a Session) -> Self {
        Self {
            success: true,
            user: &session.user,
            token: &session.access_token,
            expires_at: session.expires_at.timestamp_millis(),
            completion: None,
            handoff: None,
        }
    }

    fn from_flow(result: &'a FlowResult) -> Self {
        Self {
            completion: Some(&result.completion),
            handoff: result.handoff.as_ref(),
            ..Self::new(&result.session)
        }
    }
}

fn respond(
    req: &HttpRequest,
    store: &CookieSessionStore,
    result: Result<FlowResult, FlowError>,
) -> HttpResponse {
    match result {
        Ok(result) => ResponseBuilder::ok()
            .with_cookies(store.delta())
            .json(&SessionResponse::from_flow(&result)),
        Err(error) => flow_failure(req, error, store),
    }
}

/// `POST /api/auth/signin[?source=extension&extensionId=..]`
pub async fn sign_in(
    req: HttpRequest,
    query: web::Query<OriginQuery>,
    body: web::Json<SignInRequest>,
    flow: web::Data<CredentialFlow>,
    settings: web::Data<KnuggetSettings>,
) -> HttpResponse {
    let origin = FlowOrigin::from_query(&query);
    let mut store = session_store(&req, &settings);
    let result = flow.sign_in(&body, &origin, &mut store).await;
    respond(&req, &store, result)
}

/// `POST /api/auth/signup[?source=extension&extensionId=..]`
pub async fn sign_up(
    req: HttpRequest,
    query: web::Query<OriginQuery>,
    body: web::Json<SignUpRequest>,
    flow: web::Data<CredentialFlow>,
    settings: web::Data<KnuggetSettings>,
) -> HttpResponse {
    let origin = FlowOrigin::from_query(&query);
    let mut store = session_store(&req, &settings);
    let result = flow.sign_up(&body, &origin, &mut store).await;
    respond(&req, &store, result)
}

/// `GET|POST /api/auth/signout`
///
/// Browsers are sent back to the login page, API clients get JSON.
pub async fn sign_out(req: HttpRequest, settings: web::Data<KnuggetSettings>) -> HttpResponse {
    let mut store = session_store(&req, &settings);
    store.clear();
    log::info!("Session cleared on sign-out");

    if is_browser_request(&req) {
        ResponseBuilder::redirect(&settings.ui.login_path)
            .with_cookies(store.delta())
            .build()
    } else {
        ResponseBuilder::ok()
            .with_cookies(store.delta())
            .json(&json!({"success": true, "message": "Signed out successfully"}))
    }
}

/// `GET /api/auth/me`
pub async fn me(
    req: HttpRequest,
    backend: web::Data<BackendClient>,
    settings: web::Data<KnuggetSettings>,
) -> HttpResponse {
    let mut store = session_store(&req, &settings);
    let Some(token) = access_token(&req, &store) else {
        return ResponseBuilder::not_authenticated();
    };

    match backend.me(&token).await {
        Ok(profile) => ResponseBuilder::ok().json(&profile),
        Err(error) => backend_failure(&req, error, &mut store),
    }
}

/// `POST /api/auth/refresh`
///
/// The refresh token comes from the body, else from the `refreshToken` cookie.
pub async fn refresh(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    flow: web::Data<CredentialFlow>,
    settings: web::Data<KnuggetSettings>,
) -> HttpResponse {
    let mut store = session_store(&req, &settings);
    let refresh_token = body
        .and_then(|body| body.into_inner().refresh_token)
        .filter(|token| !token.trim().is_empty())
        .or_else(|| store.read_refresh_token());

    let Some(refresh_token) = refresh_token else {
        return flow_failure(
            &req,
            FlowError::Validation("Refresh token is required".to_string()),
            &store,
        );
    };

    match flow.refresh(&refresh_token, &mut store).await {
        Ok(session) => ResponseBuilder::ok()
            .with_cookies(store.delta())
            .json(&SessionResponse::new(&session)),
        Err(FlowError::Rejected { status: 401, message }) => {
            store.clear();
            flow_failure(&req, FlowError::Rejected { status: 401, message }, &store)
        }
        Err(error) => flow_failure(&req, error, &store),
    }
}
