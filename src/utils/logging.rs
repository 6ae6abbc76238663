// Centralized log lines for the auth flows and the extension handoff.
// Tokens never appear in logs, only whether one is present.
use log::{debug, info, warn};

use crate::handoff::{HandoffOutcome, HandoffPayload};
use crate::models::Session;
use crate::settings::KnuggetSettings;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log effective settings at startup
    pub fn log_settings_loaded(settings: &KnuggetSettings) {
        info!("🔧 Backend server: {}", settings.backend.server_url);
        info!("🔧 Rendering layer: {}", settings.frontend.renderer_url);
        match settings.extension.bridge_url.as_deref() {
            Some(bridge) => info!(
                "✅ Extension bridge configured ({bridge}), ack timeout {}ms",
                settings.extension.ack_timeout_ms
            ),
            None => info!("❌ Extension bridge not configured - handoffs will fall back to local-only"),
        }
        if settings.cookies.force_secure {
            info!("🔒 Secure cookies forced regardless of request scheme");
        }
    }

    /// Log the start of a credential flow
    pub fn log_flow_start(flow: &str, email: &str, from_extension: bool) {
        info!(
            "🔄 {flow} requested for {email} (origin: {})",
            if from_extension { "extension" } else { "web" }
        );
    }

    /// Log a persisted session
    pub fn log_session_written(session: &Session) {
        info!(
            "Session stored for user {} (refresh_token={}, expires_at={})",
            session.user.id,
            if session.refresh_token.is_some() { "present" } else { "missing" },
            session.expires_at.to_rfc3339()
        );
    }

    /// Log a handoff about to be sent
    pub fn log_handoff_attempt(peer_id: &str, payload: &HandoffPayload) {
        info!("📤 Sending session to extension {peer_id}");
        debug!(
            "Handoff payload: id={}, email={}, has_token={}, has_refresh_token={}, expires_at={}",
            payload.id,
            payload.email,
            !payload.token.is_empty(),
            payload.refresh_token.is_some(),
            payload.expires_at
        );
    }

    /// Log the resolved handoff outcome
    pub fn log_handoff_outcome(peer_id: Option<&str>, outcome: &HandoffOutcome) {
        let peer = peer_id.unwrap_or("<none>");
        if outcome.is_delivered() {
            info!("✅ Extension {peer} acknowledged the session");
        } else {
            warn!("Extension handoff to {peer} not delivered: {outcome}");
        }
    }

    /// Log a failure reported to the user
    pub fn log_flow_failure(path: &str, reason: &str) {
        warn!("Request to {path} failed: {reason}");
    }

    /// Log a session invalidated by the backend
    pub fn log_session_invalidated(path: &str) {
        info!("Backend rejected the session on {path}, clearing cookies");
    }
}
