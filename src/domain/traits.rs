//! # Domain Traits
//!
//! Abstract interfaces for the external collaborators (chat transport, webhook client).
//! Allows for pluggable implementations in the Infrastructure layer and in tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::types::WebhookOutcome;

/// Abstract interface for the chat transport (e.g. Matrix)
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Join a room by its identifier
    async fn join_room(&self, room_id: &str) -> Result<()>;

    /// Send a plain text message to a room
    async fn send_message(&self, room_id: &str, content: &str) -> Result<()>;
}

/// Abstract interface for the outbound webhook call.
/// Implementations never return an error: every failure is folded into the outcome.
#[async_trait]
pub trait WebhookInvoker: Send + Sync {
    async fn invoke(&self, url: &str) -> WebhookOutcome;
}
