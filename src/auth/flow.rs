//! Sign-in, sign-up and refresh orchestration

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use super::error::FlowError;
use super::origin::FlowOrigin;
use super::validation::{validate_sign_in, validate_sign_up};
use crate::backend::IdentityBackend;
use crate::handoff::{CrossContextNotifier, HandoffKind, HandoffOutcome, HandoffPayload};
use crate::models::{AuthResponse, Session, SignInRequest, SignUpRequest};
use crate::session::SessionStore;
use crate::settings::UiSettings;
use crate::utils::logging::LoggingHelper;

const EXTENSION_FALLBACK: &str =
    "However, we couldn't connect to the extension. Please close this tab and reload your YouTube page.";

/// What the page should do once the flow has finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Completion {
    /// Extension has the session; the tab can close itself
    #[serde(rename_all = "camelCase")]
    ReturnToExtension { message: String, close_after_ms: u64 },
    /// Signed in here, but the extension did not confirm
    #[serde(rename_all = "camelCase")]
    LocalOnly {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        diagnostic: Option<String>,
    },
    /// Plain web sign-in; go to the landing page
    #[serde(rename_all = "camelCase")]
    Navigate {
        message: String,
        redirect_to: String,
        redirect_after_ms: u64,
    },
}

impl Completion {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::ReturnToExtension { message, .. }
            | Self::LocalOnly { message, .. }
            | Self::Navigate { message, .. } => message,
        }
    }
}

/// Established session plus the reconciled result of the flow
#[derive(Debug, Clone)]
pub struct FlowResult {
    pub session: Session,
    pub completion: Completion,
    /// `None` when the flow did not come from the extension
    pub handoff: Option<HandoffOutcome>,
}

/// Sign-in/sign-up orchestration
///
/// validate, exchange credentials, persist the session, hand it to the
/// extension when the flow came from there, then reconcile both results.
#[derive(Clone)]
pub struct CredentialFlow {
    backend: Arc<dyn IdentityBackend>,
    notifier: CrossContextNotifier,
    ui: UiSettings,
}

impl CredentialFlow {
    #[must_use]
    pub fn new(
        backend: Arc<dyn IdentityBackend>,
        notifier: CrossContextNotifier,
        ui: UiSettings,
    ) -> Self {
        Self {
            backend,
            notifier,
            ui,
        }
    }

    /// # Errors
    ///
    /// Returns a [`FlowError`] when validation, the exchange, or session
    /// construction fails. Handoff failures never produce an error.
    pub async fn sign_in(
        &self,
        request: &SignInRequest,
        origin: &FlowOrigin,
        store: &mut dyn SessionStore,
    ) -> Result<FlowResult, FlowError> {
        validate_sign_in(request)?;
        LoggingHelper::log_flow_start("Sign-in", &request.email, origin.is_extension());

        let response = self.backend.sign_in(request).await?;
        self.establish(HandoffKind::Login, response, origin, store)
            .await
    }

    /// # Errors
    ///
    /// Returns a [`FlowError`] when validation, the exchange, or session
    /// construction fails. Handoff failures never produce an error.
    pub async fn sign_up(
        &self,
        request: &SignUpRequest,
        origin: &FlowOrigin,
        store: &mut dyn SessionStore,
    ) -> Result<FlowResult, FlowError> {
        validate_sign_up(request)?;
        LoggingHelper::log_flow_start("Sign-up", &request.email, origin.is_extension());

        let response = self.backend.sign_up(request).await?;
        self.establish(HandoffKind::Signup, response, origin, store)
            .await
    }

    /// Trade a refresh token for a new session and persist it
    ///
    /// # Errors
    ///
    /// Returns a [`FlowError`] when the token is blank or the backend refuses it.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        store: &mut dyn SessionStore,
    ) -> Result<Session, FlowError> {
        if refresh_token.trim().is_empty() {
            return Err(FlowError::Validation("Refresh token is required".to_string()));
        }

        let response = self.backend.refresh(refresh_token).await?;
        let mut session = Session::from_auth_response(response, Utc::now())?;
        // The backend may rotate the refresh token or leave it out
        if session.refresh_token.is_none() {
            session.refresh_token = Some(refresh_token.to_string());
        }
        store.write(&session);
        LoggingHelper::log_session_written(&session);
        Ok(session)
    }

    async fn establish(
        &self,
        kind: HandoffKind,
        response: AuthResponse,
        origin: &FlowOrigin,
        store: &mut dyn SessionStore,
    ) -> Result<FlowResult, FlowError> {
        let session = Session::from_auth_response(response, Utc::now())?;

        store.write(&session);
        LoggingHelper::log_session_written(&session);

        let handoff = if origin.is_extension() {
            let payload = HandoffPayload::from_session(&session);
            Some(self.notifier.notify(kind, payload, origin.peer_id()).await)
        } else {
            None
        };

        let completion = self.reconcile(kind, handoff.as_ref());
        Ok(FlowResult {
            session,
            completion,
            handoff,
        })
    }

    /// Map the handoff result onto the user-visible completion
    #[must_use]
    pub fn reconcile(&self, kind: HandoffKind, handoff: Option<&HandoffOutcome>) -> Completion {
        match handoff {
            None => Completion::Navigate {
                message: match kind {
                    HandoffKind::Login => "Login successful! Redirecting to dashboard...",
                    HandoffKind::Signup => "Account created successfully! Redirecting to dashboard...",
                }
                .to_string(),
                redirect_to: self.ui.landing_path.clone(),
                redirect_after_ms: self.ui.redirect_delay_ms,
            },
            Some(outcome) if outcome.is_delivered() => Completion::ReturnToExtension {
                message: match kind {
                    HandoffKind::Login => "Login successful! Returning to extension...",
                    HandoffKind::Signup => {
                        "Account created and extension connected successfully! You can close this tab and continue using YouTube."
                    }
                }
                .to_string(),
                close_after_ms: self.ui.close_delay_ms,
            },
            Some(outcome) => Completion::LocalOnly {
                message: match kind {
                    HandoffKind::Login => format!("Login successful! {EXTENSION_FALLBACK}"),
                    HandoffKind::Signup => format!("Account created successfully! {EXTENSION_FALLBACK}"),
                },
                diagnostic: outcome.diagnostic().map(str::to_string),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::handoff::{Acknowledgment, ExtensionMessaging};
    use crate::session::{CookieFactory, CookieSessionStore};
    use crate::testing::mock::{MockIdentityBackend, MockMessaging, MockReply};
    use crate::testing::TestFixtures;
    use std::time::Duration;

    fn store() -> CookieSessionStore {
        CookieSessionStore::new(CookieFactory::new(false, true, 30))
    }

    fn flow(backend: &Arc<MockIdentityBackend>, messaging: &Arc<MockMessaging>) -> CredentialFlow {
        let backend: Arc<dyn IdentityBackend> = backend.clone();
        let messaging: Arc<dyn ExtensionMessaging> = messaging.clone();
        CredentialFlow::new(
            backend,
            CrossContextNotifier::new(Some(messaging), Some(Duration::from_millis(100))),
            UiSettings::default(),
        )
    }

    fn extension_origin() -> FlowOrigin {
        FlowOrigin::Extension {
            peer_id: Some("ext-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_web_sign_in_navigates_without_handoff() {
        let backend = Arc::new(MockIdentityBackend::succeeding(TestFixtures::auth_response()));
        let messaging = Arc::new(MockMessaging::replying(MockReply::Ack(Acknowledgment::accepted())));
        let mut store = store();

        let result = flow(&backend, &messaging)
            .sign_in(&TestFixtures::sign_in_request(), &FlowOrigin::Web, &mut store)
            .await
            .unwrap();

        assert_eq!(store.read().as_deref(), Some("t1"));
        assert_eq!(messaging.sends(), 0);
        assert!(result.handoff.is_none());
        assert_eq!(
            result.completion,
            Completion::Navigate {
                message: "Login successful! Redirecting to dashboard...".to_string(),
                redirect_to: "/dashboard".to_string(),
                redirect_after_ms: 1500,
            }
        );
    }

    #[tokio::test]
    async fn test_extension_sign_in_delivered() {
        let backend = Arc::new(MockIdentityBackend::succeeding(TestFixtures::auth_response()));
        let messaging = Arc::new(MockMessaging::replying(MockReply::Ack(Acknowledgment::accepted())));
        let mut store = store();

        let result = flow(&backend, &messaging)
            .sign_in(&TestFixtures::sign_in_request(), &extension_origin(), &mut store)
            .await
            .unwrap();

        assert_eq!(messaging.sends(), 1);
        assert!(result.handoff.as_ref().unwrap().is_delivered());
        assert_eq!(
            result.completion,
            Completion::ReturnToExtension {
                message: "Login successful! Returning to extension...".to_string(),
                close_after_ms: 1500,
            }
        );
    }

    #[tokio::test]
    async fn test_extension_sign_up_fallback_keeps_session() {
        let backend = Arc::new(MockIdentityBackend::succeeding(TestFixtures::auth_response()));
        let messaging = Arc::new(MockMessaging::replying(MockReply::Silent));
        let mut store = store();

        let result = flow(&backend, &messaging)
            .sign_up(&TestFixtures::sign_up_request(), &extension_origin(), &mut store)
            .await
            .unwrap();

        assert_eq!(store.read().as_deref(), Some("t1"));
        let Completion::LocalOnly { message, diagnostic } = result.completion else {
            panic!("expected local-only completion");
        };
        assert!(message.starts_with("Account created successfully! However"));
        assert!(diagnostic.unwrap().contains("100ms"));
    }

    #[tokio::test]
    async fn test_extension_origin_without_peer_id_is_local_only() {
        let backend = Arc::new(MockIdentityBackend::succeeding(TestFixtures::auth_response()));
        let messaging = Arc::new(MockMessaging::replying(MockReply::Ack(Acknowledgment::accepted())));
        let mut store = store();

        let result = flow(&backend, &messaging)
            .sign_in(
                &TestFixtures::sign_in_request(),
                &FlowOrigin::Extension { peer_id: None },
                &mut store,
            )
            .await
            .unwrap();

        assert_eq!(messaging.sends(), 0);
        assert!(matches!(
            result.handoff,
            Some(HandoffOutcome::PeerUnavailable { .. })
        ));
        assert!(matches!(result.completion, Completion::LocalOnly { .. }));
    }

    #[tokio::test]
    async fn test_validation_failure_skips_backend() {
        let backend = Arc::new(MockIdentityBackend::succeeding(TestFixtures::auth_response()));
        let messaging = Arc::new(MockMessaging::replying(MockReply::Empty));
        let mut store = store();

        let request = SignInRequest {
            email: "user@knugget.com".to_string(),
            password: String::new(),
        };
        let error = flow(&backend, &messaging)
            .sign_in(&request, &FlowOrigin::Web, &mut store)
            .await
            .unwrap_err();

        assert!(matches!(error, FlowError::Validation(_)));
        assert_eq!(backend.calls(), 0);
        assert_eq!(store.read(), None);
    }

    #[tokio::test]
    async fn test_backend_failures_surface_without_session() {
        let messaging = Arc::new(MockMessaging::replying(MockReply::Empty));

        let backend = Arc::new(MockIdentityBackend::failing(BackendError::Unavailable(
            "down".to_string(),
        )));
        let mut store = store();
        let error = flow(&backend, &messaging)
            .sign_in(&TestFixtures::sign_in_request(), &extension_origin(), &mut store)
            .await
            .unwrap_err();
        assert!(error.is_retryable());
        assert_eq!(store.read(), None);
        assert_eq!(messaging.sends(), 0);

        let backend = Arc::new(MockIdentityBackend::succeeding(AuthResponse {
            token: Some(String::new()),
            ..TestFixtures::auth_response()
        }));
        let error = flow(&backend, &messaging)
            .sign_in(&TestFixtures::sign_in_request(), &FlowOrigin::Web, &mut store)
            .await
            .unwrap_err();
        assert!(matches!(error, FlowError::InvalidResponse(_)));
        assert_eq!(store.read(), None);
    }

    #[tokio::test]
    async fn test_refresh_keeps_previous_refresh_token() {
        let backend = Arc::new(MockIdentityBackend::succeeding(AuthResponse {
            refresh_token: None,
            ..TestFixtures::auth_response()
        }));
        let messaging = Arc::new(MockMessaging::replying(MockReply::Empty));
        let mut store = store();

        let session = flow(&backend, &messaging)
            .refresh("r-old", &mut store)
            .await
            .unwrap();

        assert_eq!(session.refresh_token.as_deref(), Some("r-old"));
        assert_eq!(store.read().as_deref(), Some("t1"));
        assert_eq!(store.read_refresh_token().as_deref(), Some("r-old"));

        let error = flow(&backend, &messaging)
            .refresh("  ", &mut store)
            .await
            .unwrap_err();
        assert_eq!(error, FlowError::Validation("Refresh token is required".into()));
    }

    #[test]
    fn test_reconcile_signup_delivered_message() {
        let backend: Arc<dyn IdentityBackend> =
            Arc::new(MockIdentityBackend::succeeding(TestFixtures::auth_response()));
        let flow = CredentialFlow::new(backend, CrossContextNotifier::disabled(), UiSettings::default());

        let completion = flow.reconcile(
            HandoffKind::Signup,
            Some(&HandoffOutcome::Delivered { diagnostic: None }),
        );
        assert_eq!(
            completion.message(),
            "Account created and extension connected successfully! You can close this tab and continue using YouTube."
        );
    }
}
