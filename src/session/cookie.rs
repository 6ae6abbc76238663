use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{DateTime, Utc};

use crate::models::DEFAULT_SESSION_HOURS;
use crate::settings::CookieSettings;

/// Cookie carrying the bearer access token
pub const AUTH_TOKEN_COOKIE: &str = "authToken";
/// Cookie carrying the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub expires: OffsetDateTime,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            same_site: SameSite::Strict,
            path: "/".to_string(),
            expires: OffsetDateTime::now_utc() + CookieDuration::hours(DEFAULT_SESSION_HOURS),
        }
    }
}

/// Cookie factory for the first-party session cookies
///
/// All cookies are site-wide (`/`), `SameSite=Strict`, and only marked
/// `Secure` when the page itself is served over HTTPS.
#[derive(Clone, Debug)]
pub struct CookieFactory {
    secure: bool,
    http_only: bool,
    refresh_token_days: i64,
}

impl CookieFactory {
    #[must_use]
    pub fn new(secure: bool, http_only: bool, refresh_token_days: i64) -> Self {
        Self {
            secure,
            http_only,
            refresh_token_days,
        }
    }

    /// Build a factory for one request, deriving `Secure` from its scheme
    #[must_use]
    pub fn for_request(req: &HttpRequest, settings: &CookieSettings) -> Self {
        let secure = settings.force_secure || req.connection_info().scheme() == "https";
        Self::new(secure, settings.http_only, settings.refresh_token_days)
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Generic cookie construction with the factory's transport flags
    #[must_use]
    pub fn create_cookie(&self, name: &str, value: &str, options: CookieOptions) -> Cookie<'static> {
        Cookie::build(name.to_owned(), value.to_owned())
            .http_only(self.http_only && options.http_only)
            .secure(self.secure && options.secure)
            .same_site(options.same_site)
            .path(options.path)
            .expires(options.expires)
            .finish()
    }

    /// Access token cookie expiring together with the session
    #[must_use]
    pub fn create_auth_token_cookie(&self, token: &str, expires_at: DateTime<Utc>) -> Cookie<'static> {
        let expires = to_offset_datetime(expires_at).unwrap_or_else(|| {
            log::warn!("Session expiry {expires_at} not representable, using default lifetime");
            OffsetDateTime::now_utc() + CookieDuration::hours(DEFAULT_SESSION_HOURS)
        });

        self.create_cookie(
            AUTH_TOKEN_COOKIE,
            token,
            CookieOptions {
                expires,
                ..Default::default()
            },
        )
    }

    /// Refresh token cookie with the fixed long horizon
    #[must_use]
    pub fn create_refresh_token_cookie(&self, refresh_token: &str) -> Cookie<'static> {
        self.create_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token,
            CookieOptions {
                expires: OffsetDateTime::now_utc() + CookieDuration::days(self.refresh_token_days),
                ..Default::default()
            },
        )
    }

    /// Create an expired cookie that makes the browser drop `name`
    #[must_use]
    pub fn create_expired_cookie(&self, name: &str) -> Cookie<'static> {
        let mut cookie = self.create_cookie(
            name,
            "",
            CookieOptions {
                expires: OffsetDateTime::UNIX_EPOCH,
                ..Default::default()
            },
        );
        cookie.set_max_age(CookieDuration::ZERO);
        cookie
    }
}

fn to_offset_datetime(value: DateTime<Utc>) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(value.timestamp()).ok()
}

/// Read a non-empty cookie value from the request
#[must_use]
pub fn extract_cookie_value(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    req.cookie(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;
    use chrono::Duration;

    fn factory() -> CookieFactory {
        CookieFactory::new(true, true, 30)
    }

    #[test]
    fn test_auth_token_cookie_follows_session_expiry() {
        let expires_at = Utc::now() + Duration::hours(1);
        let cookie = factory().create_auth_token_cookie("t1", expires_at);

        assert_eq!(cookie.name(), AUTH_TOKEN_COOKIE);
        assert_eq!(cookie.value(), "t1");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.expires_datetime().unwrap().unix_timestamp(),
            expires_at.timestamp()
        );
    }

    #[test]
    fn test_refresh_cookie_uses_fixed_horizon() {
        let cookie = factory().create_refresh_token_cookie("r1");
        let expires = cookie.expires_datetime().unwrap();
        let horizon = expires - OffsetDateTime::now_utc();

        assert_eq!(cookie.name(), REFRESH_TOKEN_COOKIE);
        assert!(horizon > CookieDuration::days(29));
        assert!(horizon <= CookieDuration::days(30));
    }

    #[test]
    fn test_insecure_transport_drops_secure_flag() {
        let cookie = CookieFactory::new(false, false, 30)
            .create_auth_token_cookie("t1", Utc::now() + Duration::hours(1));

        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.http_only(), Some(false));
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = factory().create_expired_cookie(AUTH_TOKEN_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
        assert!(cookie.expires_datetime().unwrap() < OffsetDateTime::now_utc());
    }

    #[test]
    fn test_for_request_reads_scheme() {
        let settings = CookieSettings::default();

        let plain = actix_test::TestRequest::get().uri("/").to_http_request();
        assert!(!CookieFactory::for_request(&plain, &settings).is_secure());

        let tls = actix_test::TestRequest::get()
            .uri("/")
            .insert_header(("X-Forwarded-Proto", "https"))
            .to_http_request();
        assert!(CookieFactory::for_request(&tls, &settings).is_secure());

        let forced = CookieSettings {
            force_secure: true,
            ..CookieSettings::default()
        };
        assert!(CookieFactory::for_request(&plain, &forced).is_secure());
    }

    #[test]
    fn test_extract_cookie_value_ignores_empty() {
        let req = actix_test::TestRequest::get()
            .cookie(Cookie::new(AUTH_TOKEN_COOKIE, ""))
            .to_http_request();
        assert_eq!(extract_cookie_value(&req, AUTH_TOKEN_COOKIE), None);

        let req = actix_test::TestRequest::get()
            .cookie(Cookie::new(AUTH_TOKEN_COOKIE, "t1"))
            .to_http_request();
        assert_eq!(
            extract_cookie_value(&req, AUTH_TOKEN_COOKIE).as_deref(),
            Some("t1")
        );
    }
}
