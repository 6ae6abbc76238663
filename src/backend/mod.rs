//! External identity/summary backend
//!
//! The backend issues tokens, validates credentials and stores summaries; this
//! crate only forwards to it. Credential exchange sits behind
//! [`IdentityBackend`] so the sign-in flow can run against a test double.

pub mod client;

use async_trait::async_trait;

use crate::models::{AuthResponse, SignInRequest, SignUpRequest};

pub use client::{BackendClient, BackendError, SummaryQuery, SERVICE_UNAVAILABLE_MESSAGE};

/// Credential exchange with the identity server
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Exchange email and password for a session
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] describing why no session was issued.
    async fn sign_in(&self, credentials: &SignInRequest) -> Result<AuthResponse, BackendError>;

    /// Register a new account and receive its first session
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] describing why no session was issued.
    async fn sign_up(&self, credentials: &SignUpRequest) -> Result<AuthResponse, BackendError>;

    /// Trade a refresh token for a new session
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] describing why no session was issued.
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, BackendError>;
}
