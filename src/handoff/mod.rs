//! Extension handoff
//!
//! Delivers a freshly established session to the companion browser extension.
//! The extension lives in its own sandbox and never sees the web app's
//! cookies, so the session travels as a message and the extension confirms
//! receipt through an acknowledgment.
//!
//! - [`types`] - payload, envelope, acknowledgment and outcome types
//! - [`messaging`] - the injected messaging capability and its HTTP bridge
//! - [`notifier`] - precondition checks, the single send, and outcome resolution

pub mod messaging;
pub mod notifier;
pub mod types;

pub use messaging::{ChannelError, ExtensionMessaging, HttpBridgeMessaging};
pub use notifier::CrossContextNotifier;
pub use types::{
    Acknowledgment, HandoffKind, HandoffOutcome, HandoffPayload, HandoffRequest, MessageType,
};
