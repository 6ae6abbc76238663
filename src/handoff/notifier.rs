//! Session delivery to the extension peer
//!
//! Checks that a peer and a usable channel exist, issues a single send and
//! waits a bounded time for the acknowledgment. Every path ends in exactly one
//! [`HandoffOutcome`](super::types::HandoffOutcome).

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;

use super::messaging::ExtensionMessaging;
use super::types::{HandoffKind, HandoffOutcome, HandoffPayload, HandoffRequest};
use crate::utils::logging::LoggingHelper;

pub const NO_PEER_ID: &str = "No extension ID found in URL";
pub const NO_MESSAGING: &str = "Extension messaging API not available";
pub const NO_SEND_OPERATION: &str = "Extension runtime sendMessage not available";
pub const NO_ACKNOWLEDGMENT: &str = "No acknowledgment from extension";

/// Delivers a session to the extension peer and resolves one outcome
///
/// `notify` never fails and never panics: every delivery problem, including a
/// panic inside the messaging implementation, becomes a [`HandoffOutcome`].
#[derive(Clone)]
pub struct CrossContextNotifier {
    messaging: Option<Arc<dyn ExtensionMessaging>>,
    ack_timeout: Option<Duration>,
}

impl CrossContextNotifier {
    /// `ack_timeout = None` waits for the acknowledgment indefinitely
    #[must_use]
    pub fn new(messaging: Option<Arc<dyn ExtensionMessaging>>, ack_timeout: Option<Duration>) -> Self {
        Self {
            messaging,
            ack_timeout,
        }
    }

    /// Notifier for a host without any extension messaging
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    #[must_use]
    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout
    }

    /// Hand `payload` to the extension identified by `peer_id`
    pub async fn notify(
        &self,
        kind: HandoffKind,
        payload: HandoffPayload,
        peer_id: Option<&str>,
    ) -> HandoffOutcome {
        let outcome = self.deliver(kind, payload, peer_id).await;
        LoggingHelper::log_handoff_outcome(peer_id, &outcome);
        outcome
    }

    async fn deliver(
        &self,
        kind: HandoffKind,
        payload: HandoffPayload,
        peer_id: Option<&str>,
    ) -> HandoffOutcome {
        let Some(peer_id) = peer_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return HandoffOutcome::peer_unavailable(NO_PEER_ID);
        };
        let Some(messaging) = self.messaging.as_ref() else {
            return HandoffOutcome::channel_unavailable(NO_MESSAGING);
        };
        if !messaging.can_send() {
            return HandoffOutcome::channel_unavailable(NO_SEND_OPERATION);
        }

        LoggingHelper::log_handoff_attempt(peer_id, &payload);
        let request = HandoffRequest::new(kind, payload);

        // The send runs as its own task so a panicking implementation is
        // observed as a JoinError instead of unwinding through the caller.
        let messaging = Arc::clone(messaging);
        let peer = peer_id.to_string();
        let mut task =
            tokio::spawn(async move { messaging.send_message(&peer, &request).await });

        let joined = match self.ack_timeout {
            Some(limit) => {
                if let Ok(joined) = tokio::time::timeout(limit, &mut task).await {
                    joined
                } else {
                    task.abort();
                    return HandoffOutcome::peer_unavailable(format!(
                        "No acknowledgment from extension within {}ms",
                        limit.as_millis()
                    ));
                }
            }
            None => task.await,
        };

        match joined {
            Ok(Ok(Some(ack))) if ack.success => HandoffOutcome::Delivered { diagnostic: None },
            Ok(Ok(Some(ack))) => {
                let reply = serde_json::to_string(&ack).unwrap_or_else(|_| "{}".to_string());
                HandoffOutcome::peer_rejected(format!(
                    "Failed to communicate with extension: {reply}"
                ))
            }
            Ok(Ok(None)) => HandoffOutcome::peer_rejected(NO_ACKNOWLEDGMENT),
            Ok(Err(e)) => HandoffOutcome::peer_rejected(format!(
                "Error communicating with extension: {e}"
            )),
            Err(join_error) => {
                log::error!("Extension messaging task failed: {join_error}");
                HandoffOutcome::peer_rejected(format!(
                    "Error communicating with extension: {}",
                    describe_join_error(join_error)
                ))
            }
        }
    }
}

fn describe_join_error(join_error: JoinError) -> String {
    if !join_error.is_panic() {
        return join_error.to_string();
    }
    panic_message(join_error.into_panic().as_ref())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "messaging task panicked".to_string()
    }
}
