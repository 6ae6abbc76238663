//! Extension messaging capability
//!
//! The host environment may or may not expose a way to reach the extension.
//! Callers receive it as an injected collaborator so that tests can swap in
//! doubles and deployments without a bridge simply pass `None`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::types::{Acknowledgment, HandoffRequest};

/// Delivery-layer failures
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("could not reach extension bridge: {0}")]
    Transport(String),
    #[error("extension bridge returned status {status}")]
    Rejected { status: u16 },
    #[error("malformed acknowledgment: {0}")]
    MalformedAck(String),
    #[error("{0}")]
    Other(String),
}

/// Messaging capability that reaches the extension runtime
#[async_trait]
pub trait ExtensionMessaging: Send + Sync {
    /// Whether this capability exposes the send operation
    fn can_send(&self) -> bool;

    /// Issue one message to `peer_id`
    ///
    /// Resolves with the acknowledgment the peer passed to its callback, or
    /// `None` when the callback fired without a reply.
    ///
    /// # Errors
    ///
    /// Returns an error when the message could not be handed to the runtime.
    async fn send_message(
        &self,
        peer_id: &str,
        request: &HandoffRequest,
    ) -> Result<Option<Acknowledgment>, ChannelError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BridgeMessage<'a> {
    extension_id: &'a str,
    message: &'a HandoffRequest,
}

/// Messaging through an HTTP bridge in front of the browser runtime
///
/// The bridge accepts `{extensionId, message}` on `{bridge_url}/runtime/sendMessage` and
/// answers with the acknowledgment JSON (or `null`).
pub struct HttpBridgeMessaging {
    client: Client,
    endpoint: String,
}

impl HttpBridgeMessaging {
    /// # Errors
    ///
    /// Returns an error if the bridge URL is invalid or the client cannot be built.
    pub fn new(bridge_url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let mut endpoint = url::Url::parse(bridge_url)?;
        endpoint
            .path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Bridge URL cannot carry a path: {bridge_url}"))?
            .pop_if_empty()
            .extend(["runtime", "sendMessage"]);
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ExtensionMessaging for HttpBridgeMessaging {
    fn can_send(&self) -> bool {
        true
    }

    async fn send_message(
        &self,
        peer_id: &str,
        request: &HandoffRequest,
    ) -> Result<Option<Acknowledgment>, ChannelError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&BridgeMessage {
                extension_id: peer_id,
                message: request,
            })
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;
        parse_acknowledgment(&body)
    }
}

/// Parse a bridge reply; an empty body or `null` means the callback got nothing
///
/// # Errors
///
/// Returns an error if the body is neither empty, `null`, nor an acknowledgment object.
pub fn parse_acknowledgment(body: &str) -> Result<Option<Acknowledgment>, ChannelError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<Acknowledgment>>(trimmed)
        .map_err(|e| ChannelError::MalformedAck(e.to_string()))
}
