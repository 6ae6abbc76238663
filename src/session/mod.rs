//! Session Management Module
//!
//! # Modules
//!
//! - [`cookie`] - Cookie construction for the first-party session cookies
//! - [`store`] - The `SessionStore` abstraction and its cookie-jar implementation

pub mod cookie;
pub mod store;

pub use cookie::{CookieFactory, CookieOptions, AUTH_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use store::{CookieSessionStore, SessionStore};
