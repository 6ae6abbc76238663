//! Pre-built test data

use chrono::{Duration, Utc};

use super::constants::{TEST_EMAIL, TEST_TOKEN, TEST_USER_ID, TEST_USER_NAME};
use crate::models::{AuthResponse, ExpiresAt, Session, SessionUser, SignInRequest, SignUpRequest};
use crate::settings::KnuggetSettings;

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    #[must_use]
    pub fn user() -> SessionUser {
        SessionUser {
            id: TEST_USER_ID.to_string(),
            email: TEST_EMAIL.to_string(),
            name: Some(TEST_USER_NAME.to_string()),
            plan: Some("free".to_string()),
            credits: Some(3),
        }
    }

    /// Session valid for one more hour
    #[must_use]
    pub fn session() -> Session {
        Session {
            access_token: TEST_TOKEN.to_string(),
            refresh_token: Some("r1".to_string()),
            expires_at: Utc::now() + Duration::hours(1),
            user: Self::user(),
        }
    }

    /// Backend reply to a successful exchange, expiring in one hour
    #[must_use]
    pub fn auth_response() -> AuthResponse {
        AuthResponse {
            user: Some(Self::user()),
            token: Some(TEST_TOKEN.to_string()),
            refresh_token: Some("r1".to_string()),
            expires_at: Some(ExpiresAt::Millis(
                (Utc::now() + Duration::hours(1)).timestamp_millis(),
            )),
        }
    }

    #[must_use]
    pub fn sign_in_request() -> SignInRequest {
        SignInRequest {
            email: TEST_EMAIL.to_string(),
            password: "correct-horse".to_string(),
        }
    }

    #[must_use]
    pub fn sign_up_request() -> SignUpRequest {
        SignUpRequest {
            name: TEST_USER_NAME.to_string(),
            email: TEST_EMAIL.to_string(),
            password: "correct-horse".to_string(),
            confirm_password: Some("correct-horse".to_string()),
        }
    }

    /// Default settings pointed at the given backend, handoff deadline shortened
    #[must_use]
    pub fn settings(server_url: &str) -> KnuggetSettings {
        let mut settings = KnuggetSettings::default();
        settings.backend.server_url = server_url.to_string();
        settings.backend.request_timeout_secs = 5;
        settings.extension.ack_timeout_ms = 200;
        settings
    }
}
