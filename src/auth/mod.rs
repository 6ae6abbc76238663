//! Credential flows and outcome reconciliation
//!
//! Sign-in and sign-up exchange credentials with the backend, persist the
//! resulting session and, for extension-initiated flows, hand the session to
//! the extension before deciding what the page shows.

pub mod error;
pub mod flow;
pub mod origin;
pub mod validation;

pub use error::FlowError;
pub use flow::{Completion, CredentialFlow, FlowResult};
pub use origin::{FlowOrigin, OriginQuery};
