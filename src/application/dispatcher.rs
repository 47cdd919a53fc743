//! # Message Dispatcher
//!
//! Turns a room message into at most one webhook call.
//! A message is dispatched only if it is plain text, starts with the command prefix,
//! comes from a whitelisted sender, names a command that sender may use, and that
//! command has a webhook. Everything else is dropped without noise.

use std::sync::Arc;

use crate::application::access::{AuthorizationTable, CommandRegistry};
use crate::domain::traits::{ChatTransport, WebhookInvoker};
use crate::domain::types::{DispatchOutcome, IgnoreReason, MessageKind, RoomMessage};
use crate::strings::logs;

pub struct MessageDispatcher {
    prefix: String,
    acknowledgement: Option<String>,
    authorization: AuthorizationTable,
    registry: CommandRegistry,
    transport: Arc<dyn ChatTransport>,
    webhooks: Arc<dyn WebhookInvoker>,
}

impl MessageDispatcher {
    pub fn new(
        prefix: String,
        acknowledgement: Option<String>,
        (authorization, registry): (AuthorizationTable, CommandRegistry),
        transport: Arc<dyn ChatTransport>,
        webhooks: Arc<dyn WebhookInvoker>,
    ) -> Self {
        Self {
            prefix,
            acknowledgement,
            authorization,
            registry,
            transport,
            webhooks,
        }
    }

    /// Extracts the command from a message body, if it carries the prefix.
    /// The prefix is removed by length, then surrounding whitespace is trimmed.
    pub fn extract_command<'a>(&self, body: &'a str) -> Option<&'a str> {
        body.strip_prefix(self.prefix.as_str()).map(str::trim)
    }

    pub async fn handle(&self, message: &RoomMessage) -> DispatchOutcome {
        let outcome = self.dispatch(message).await;
        if let DispatchOutcome::Ignored(reason) = outcome {
            tracing::debug!(
                "Ignored message in {} from {}: {:?}",
                message.room_id,
                message.sender,
                reason
            );
        }
        outcome
    }

    async fn dispatch(&self, message: &RoomMessage) -> DispatchOutcome {
        if message.kind != MessageKind::Text {
            return DispatchOutcome::Ignored(IgnoreReason::NotText);
        }

        let Some(command) = self.extract_command(&message.body) else {
            return DispatchOutcome::Ignored(IgnoreReason::NoPrefix);
        };
        if command.is_empty() {
            return DispatchOutcome::Ignored(IgnoreReason::EmptyCommand);
        }

        let Some(permitted) = self.authorization.permitted_commands(&message.sender) else {
            return DispatchOutcome::Ignored(IgnoreReason::UnknownSender);
        };
        if !permitted.contains(command) {
            return DispatchOutcome::Ignored(IgnoreReason::NotPermitted);
        }

        let Some(url) = self.registry.webhook_for(command) else {
            tracing::warn!("{}", logs::missing_webhook(command, &message.sender));
            return DispatchOutcome::MissingWebhook(command.to_string());
        };

        tracing::info!(
            "Dispatching `{}` from {} in {} to {}",
            command,
            message.sender,
            message.room_id,
            url
        );
        let outcome = self.webhooks.invoke(url).await;

        if outcome.is_delivered() {
            if let Some(ack) = &self.acknowledgement {
                if let Err(e) = self.transport.send_message(&message.room_id, ack).await {
                    tracing::warn!("{}", logs::ack_send_fail(&message.room_id, &e.to_string()));
                }
            }
        }

        DispatchOutcome::Invoked {
            command: command.to_string(),
            outcome,
        }
    }
}
