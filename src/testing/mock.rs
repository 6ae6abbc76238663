//! Fake collaborators for the backend and the extension channel
//!
//! Both record how often they were called so tests can assert that a send
//! or an exchange did not happen.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::backend::{BackendError, IdentityBackend};
use crate::handoff::{Acknowledgment, ChannelError, ExtensionMessaging, HandoffRequest};
use crate::models::{AuthResponse, SignInRequest, SignUpRequest};

/// How the fake extension answers a send
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Callback invoked with this acknowledgment
    Ack(Acknowledgment),
    /// Callback invoked with nothing
    Empty,
    /// Runtime reports a delivery error
    Fail(String),
    /// Messaging implementation panics mid-send
    Panic,
    /// Callback never invoked
    Silent,
}

/// Fake extension messaging capability
pub struct MockMessaging {
    can_send: bool,
    reply: MockReply,
    sends: AtomicUsize,
    last_request: Mutex<Option<(String, HandoffRequest)>>,
}

impl MockMessaging {
    #[must_use]
    pub fn replying(reply: MockReply) -> Self {
        Self {
            can_send: true,
            reply,
            sends: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Capability present but without a send operation
    #[must_use]
    pub fn without_send() -> Self {
        Self {
            can_send: false,
            ..Self::replying(MockReply::Empty)
        }
    }

    /// Number of sends issued
    #[must_use]
    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    /// Peer id and request of the most recent send
    ///
    /// # Panics
    ///
    /// Panics if the request mutex is poisoned.
    #[must_use]
    pub fn last_request(&self) -> Option<(String, HandoffRequest)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtensionMessaging for MockMessaging {
    fn can_send(&self) -> bool {
        self.can_send
    }

    async fn send_message(
        &self,
        peer_id: &str,
        request: &HandoffRequest,
    ) -> Result<Option<Acknowledgment>, ChannelError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((peer_id.to_string(), request.clone()));

        match &self.reply {
            MockReply::Ack(ack) => Ok(Some(ack.clone())),
            MockReply::Empty => Ok(None),
            MockReply::Fail(reason) => Err(ChannelError::Other(reason.clone())),
            MockReply::Panic => panic!("extension runtime crashed"),
            MockReply::Silent => std::future::pending().await,
        }
    }
}

/// Fake identity backend answering every exchange the same way
pub struct MockIdentityBackend {
    result: Result<AuthResponse, BackendError>,
    calls: AtomicUsize,
}

impl MockIdentityBackend {
    #[must_use]
    pub fn succeeding(response: AuthResponse) -> Self {
        Self {
            result: Ok(response),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing(error: BackendError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of exchanges attempted
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<AuthResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[async_trait]
impl IdentityBackend for MockIdentityBackend {
    async fn sign_in(&self, _credentials: &SignInRequest) -> Result<AuthResponse, BackendError> {
        self.answer()
    }

    async fn sign_up(&self, _credentials: &SignUpRequest) -> Result<AuthResponse, BackendError> {
        self.answer()
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<AuthResponse, BackendError> {
        self.answer()
    }
}
