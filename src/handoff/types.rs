//! Wire types exchanged with the extension and the outcome of a handoff

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Session;

/// Which credential flow produced the session being handed off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffKind {
    Login,
    Signup,
}

impl HandoffKind {
    /// Message type understood by the extension for this kind
    #[must_use]
    pub fn message_type(self) -> MessageType {
        match self {
            Self::Login => MessageType::KnuggetAuthSuccess,
            Self::Signup => MessageType::AuthSignupSuccess,
        }
    }
}

/// Envelope `type` values on the extension channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    KnuggetAuthSuccess,
    AuthLoginSuccess,
    AuthSignupSuccess,
}

/// Session fields forwarded to the extension peer
///
/// Built fresh for every attempt and never persisted here. An absent refresh
/// token stays absent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffPayload {
    pub id: String,
    pub email: String,
    pub name: String,
    pub plan: String,
    pub credits: i64,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Epoch milliseconds
    pub expires_at: i64,
}

impl HandoffPayload {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let user = &session.user;
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone().unwrap_or_default(),
            plan: user.plan.clone().unwrap_or_else(|| "free".to_string()),
            credits: user.credits.unwrap_or(0),
            token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffRequest {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: HandoffPayload,
}

impl HandoffRequest {
    #[must_use]
    pub fn new(kind: HandoffKind, payload: HandoffPayload) -> Self {
        Self {
            message_type: kind.message_type(),
            payload,
        }
    }
}

/// Reply passed by the extension to the send callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Acknowledgment {
    #[must_use]
    pub fn accepted() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn refused(reason: &str) -> Self {
        Self {
            success: false,
            error: Some(reason.to_string()),
        }
    }
}

/// Terminal result of one handoff attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HandoffOutcome {
    Delivered { diagnostic: Option<String> },
    PeerRejected { diagnostic: Option<String> },
    PeerUnavailable { diagnostic: Option<String> },
    ChannelUnavailable { diagnostic: Option<String> },
}

impl HandoffOutcome {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Delivered { diagnostic }
            | Self::PeerRejected { diagnostic }
            | Self::PeerUnavailable { diagnostic }
            | Self::ChannelUnavailable { diagnostic } => diagnostic.as_deref(),
        }
    }

    pub(crate) fn peer_rejected(reason: impl Into<String>) -> Self {
        Self::PeerRejected {
            diagnostic: Some(reason.into()),
        }
    }

    pub(crate) fn peer_unavailable(reason: impl Into<String>) -> Self {
        Self::PeerUnavailable {
            diagnostic: Some(reason.into()),
        }
    }

    pub(crate) fn channel_unavailable(reason: impl Into<String>) -> Self {
        Self::ChannelUnavailable {
            diagnostic: Some(reason.into()),
        }
    }
}

impl fmt::Display for HandoffOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Delivered { .. } => "delivered",
            Self::PeerRejected { .. } => "peer rejected",
            Self::PeerUnavailable { .. } => "peer unavailable",
            Self::ChannelUnavailable { .. } => "channel unavailable",
        };
        match self.diagnostic() {
            Some(diagnostic) => write!(f, "{label}: {diagnostic}"),
            None => f.write_str(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionUser;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn session(refresh_token: Option<&str>) -> Session {
        Session {
            access_token: "t1".to_string(),
            refresh_token: refresh_token.map(ToString::to_string),
            expires_at: Utc::now() + Duration::hours(1),
            user: SessionUser {
                id: "u1".to_string(),
                email: "user@example.com".to_string(),
                ..SessionUser::default()
            },
        }
    }

    #[test]
    fn test_payload_defaults_profile_fields() {
        let payload = HandoffPayload::from_session(&session(None));

        assert_eq!(payload.name, "");
        assert_eq!(payload.plan, "free");
        assert_eq!(payload.credits, 0);
        assert_eq!(payload.token, "t1");
    }

    #[test]
    fn test_absent_refresh_token_is_not_aliased() {
        let request = HandoffRequest::new(
            HandoffKind::Signup,
            HandoffPayload::from_session(&session(None)),
        );
        let wire = serde_json::to_value(&request).unwrap();

        assert_eq!(wire["type"], "AUTH_SIGNUP_SUCCESS");
        assert!(wire["payload"].get("refreshToken").is_none());
        assert_eq!(wire["payload"]["token"], "t1");
    }

    #[test]
    fn test_login_envelope_wire_shape() {
        let request = HandoffRequest::new(
            HandoffKind::Login,
            HandoffPayload::from_session(&session(Some("r1"))),
        );
        let wire = serde_json::to_value(&request).unwrap();

        assert_eq!(wire["type"], "KNUGGET_AUTH_SUCCESS");
        assert_eq!(wire["payload"]["refreshToken"], "r1");
        assert!(wire["payload"]["expiresAt"].is_i64());
    }

    #[test]
    fn test_acknowledgment_parsing() {
        let ack: Acknowledgment = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(ack.success);

        let ack: Acknowledgment = serde_json::from_value(json!({})).unwrap();
        assert!(!ack.success);

        let parsed: MessageType = serde_json::from_value(json!("AUTH_LOGIN_SUCCESS")).unwrap();
        assert_eq!(parsed, MessageType::AuthLoginSuccess);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = HandoffOutcome::peer_unavailable("No extension ID found in URL");
        let wire = serde_json::to_value(&outcome).unwrap();

        assert_eq!(wire["status"], "peer_unavailable");
        assert_eq!(wire["diagnostic"], "No extension ID found in URL");
        assert_eq!(
            outcome.to_string(),
            "peer unavailable: No extension ID found in URL"
        );
    }
}
