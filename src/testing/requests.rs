//! Request builders for handler and middleware tests

use actix_web::cookie::Cookie;
use actix_web::test::TestRequest;
use serde::Serialize;

use super::constants::TEST_USER_AGENT;
use crate::session::{AUTH_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

/// Common request shapes
pub struct TestRequests;

impl TestRequests {
    /// Page navigation from a browser
    #[must_use]
    pub fn browser(path: &str) -> TestRequest {
        TestRequest::get()
            .uri(path)
            .insert_header(("User-Agent", TEST_USER_AGENT))
            .insert_header((
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ))
    }

    /// Page navigation carrying a session cookie
    #[must_use]
    pub fn browser_with_token(path: &str, token: &str) -> TestRequest {
        Self::browser(path).cookie(Cookie::new(AUTH_TOKEN_COOKIE, token.to_string()))
    }

    /// JSON API call
    #[must_use]
    pub fn api(path: &str) -> TestRequest {
        TestRequest::get()
            .uri(path)
            .insert_header(("Accept", "application/json"))
    }

    /// JSON POST with a body
    #[must_use]
    pub fn post_json<T: Serialize>(path: &str, body: &T) -> TestRequest {
        TestRequest::post()
            .uri(path)
            .insert_header(("Accept", "application/json"))
            .set_json(body)
    }

    /// Attach both session cookies
    #[must_use]
    pub fn with_session(request: TestRequest, token: &str, refresh_token: &str) -> TestRequest {
        request
            .cookie(Cookie::new(AUTH_TOKEN_COOKIE, token.to_string()))
            .cookie(Cookie::new(REFRESH_TOKEN_COOKIE, refresh_token.to_string()))
    }
}
