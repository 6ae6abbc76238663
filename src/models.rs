use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Fallback lifetime applied when the backend omits `expiresAt`
pub const DEFAULT_SESSION_HOURS: i64 = 24;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Minimal user profile carried by a session
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
}

/// Sign-in credentials as submitted by the login form
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Sign-up credentials as submitted by the registration form
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Expiry as reported by the backend: epoch milliseconds or an RFC 3339 string
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ExpiresAt {
    Millis(i64),
    Timestamp(String),
}

impl ExpiresAt {
    /// Convert to a UTC timestamp, `None` when the value is unparseable
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Self::Timestamp(raw) => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Successful credential exchange as returned by the identity backend
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<ExpiresAt>,
}

/// Reasons a backend response cannot become a session
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("response did not include an access token")]
    MissingToken,
    #[error("response did not include a user id")]
    MissingUser,
    #[error("session expiry is not a valid timestamp")]
    InvalidExpiry,
    #[error("session expiry {0} is not in the future")]
    AlreadyExpired(DateTime<Utc>),
}

/// The authenticated identity held by the browser
///
/// `access_token` is never empty and `expires_at` is in the future when the
/// session is built through [`Session::from_auth_response`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
}

impl Session {
    /// Build a session from a credential exchange response
    ///
    /// # Errors
    ///
    /// Returns an error if the token or user id is missing, or the expiry
    /// cannot be parsed or already lies in the past.
    pub fn from_auth_response(
        response: AuthResponse,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let access_token = response
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or(SessionError::MissingToken)?;

        let user = response
            .user
            .filter(|user| !user.id.is_empty())
            .ok_or(SessionError::MissingUser)?;

        let expires_at = match response.expires_at {
            Some(raw) => raw.to_datetime().ok_or(SessionError::InvalidExpiry)?,
            None => now + Duration::hours(DEFAULT_SESSION_HOURS),
        };
        if expires_at <= now {
            return Err(SessionError::AlreadyExpired(expires_at));
        }

        Ok(Self {
            access_token,
            refresh_token: response.refresh_token.filter(|token| !token.is_empty()),
            expires_at,
            user,
        })
    }

    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && self.expires_at > now
    }
}
