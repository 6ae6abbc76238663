//! First-party session store
//!
//! The browser's cookie jar is the single source of truth for "is the user
//! authenticated". A [`CookieSessionStore`] is seeded from the cookies of the
//! incoming request, mutated by the handler, and its delta is attached to the
//! response as `Set-Cookie` headers.

use actix_web::cookie::{Cookie, CookieJar};
use actix_web::{HttpRequest, HttpResponseBuilder};

use crate::models::Session;
use crate::session::cookie::{CookieFactory, AUTH_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

/// Durable storage of the current session
///
/// Writes are best-effort: the outcome of a sign-in never depends on reading
/// the value back, so persistence problems are logged rather than returned.
pub trait SessionStore {
    /// Persist the access token (and refresh token, when present)
    fn write(&mut self, session: &Session);

    /// Current access token, `None` when absent or cleared
    fn read(&self) -> Option<String>;

    /// Remove every persisted session field
    fn clear(&mut self);
}

/// Session store backed by the request/response cookie pair
pub struct CookieSessionStore {
    jar: CookieJar,
    factory: CookieFactory,
}

impl CookieSessionStore {
    /// Empty store, as for a browser without cookies
    #[must_use]
    pub fn new(factory: CookieFactory) -> Self {
        Self {
            jar: CookieJar::new(),
            factory,
        }
    }

    /// Store seeded with the session cookies the browser sent
    #[must_use]
    pub fn from_request(req: &HttpRequest, factory: CookieFactory) -> Self {
        let mut jar = CookieJar::new();
        for name in [AUTH_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
            if let Some(cookie) = req.cookie(name) {
                jar.add_original(cookie.into_owned());
            }
        }
        Self { jar, factory }
    }

    /// Refresh token currently held, if any
    #[must_use]
    pub fn read_refresh_token(&self) -> Option<String> {
        non_empty_value(&self.jar, REFRESH_TOKEN_COOKIE)
    }

    /// Cookies changed since the store was created
    #[must_use]
    pub fn delta(&self) -> Vec<Cookie<'static>> {
        self.jar.delta().cloned().collect()
    }

    /// Attach the pending cookie changes to a response
    pub fn apply_to(&self, builder: &mut HttpResponseBuilder) {
        for cookie in self.delta() {
            builder.cookie(cookie);
        }
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.factory.is_secure()
    }
}

impl SessionStore for CookieSessionStore {
    fn write(&mut self, session: &Session) {
        if session.access_token.is_empty() {
            log::warn!("Refusing to persist a session without an access token");
            return;
        }

        self.jar.add(
            self.factory
                .create_auth_token_cookie(&session.access_token, session.expires_at),
        );

        match &session.refresh_token {
            Some(refresh_token) => self
                .jar
                .add(self.factory.create_refresh_token_cookie(refresh_token)),
            None => log::debug!("No refresh token issued, keeping access token only"),
        }
    }

    fn read(&self) -> Option<String> {
        non_empty_value(&self.jar, AUTH_TOKEN_COOKIE)
    }

    fn clear(&mut self) {
        for name in [AUTH_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
            self.jar.add(self.factory.create_expired_cookie(name));
        }
        log::debug!("Session cookies cleared");
    }
}

fn non_empty_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
