#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the knugget-web application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod auth;
pub mod backend;
pub mod handlers;
pub mod handoff;
pub mod middleware;
pub mod models;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Arc;

/// Re-export commonly used items
pub use auth::{Completion, CredentialFlow, FlowError, FlowOrigin};
pub use backend::{BackendClient, IdentityBackend};
pub use handlers::configure_services;
pub use handoff::{CrossContextNotifier, ExtensionMessaging, HandoffOutcome, HttpBridgeMessaging};
pub use models::Session;
pub use session::{CookieSessionStore, SessionStore};
pub use settings::KnuggetSettings;

/// Build the extension notifier from settings
///
/// Without a configured bridge the messaging capability is absent and every
/// handoff resolves as channel-unavailable.
///
/// # Errors
///
/// Returns an error if the bridge URL is invalid.
pub fn build_notifier(settings: &KnuggetSettings) -> anyhow::Result<CrossContextNotifier> {
    let messaging: Option<Arc<dyn ExtensionMessaging>> = match &settings.extension.bridge_url {
        Some(bridge_url) => Some(Arc::new(HttpBridgeMessaging::new(
            bridge_url,
            std::time::Duration::from_secs(settings.backend.request_timeout_secs),
        )?)),
        None => None,
    };
    Ok(CrossContextNotifier::new(
        messaging,
        settings.extension.ack_timeout(),
    ))
}

/// Build the production credential flow over `backend`
///
/// # Errors
///
/// Returns an error if the notifier cannot be built.
pub fn build_credential_flow(
    settings: &KnuggetSettings,
    backend: BackendClient,
) -> anyhow::Result<CredentialFlow> {
    Ok(CredentialFlow::new(
        Arc::new(backend),
        build_notifier(settings)?,
        settings.ui.clone(),
    ))
}
