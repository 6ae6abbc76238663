//! Shared test utilities
//!
//! Compiled for unit tests and, behind the `testing` feature, for the
//! integration tests under `tests/`.
//!
//! - [`fixtures`] - sessions, backend replies and settings
//! - [`mock`] - fake backend and extension messaging
//! - [`requests`] - request builders for handler tests

pub mod fixtures;
pub mod mock;
pub mod requests;

pub use fixtures::TestFixtures;
pub use requests::TestRequests;

/// Common test constants
pub mod constants {
    pub const TEST_USER_ID: &str = "u1";
    pub const TEST_EMAIL: &str = "test@knugget.com";
    pub const TEST_USER_NAME: &str = "Test User";
    pub const TEST_TOKEN: &str = "t1";
    pub const TEST_EXTENSION_ID: &str = "abcdefghijklmnop";
    pub const TEST_USER_AGENT: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";
}
