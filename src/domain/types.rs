//! # Domain Types
//!
//! Events and outcomes passed between the transport adapter, the event loop and the handlers.

/// The kind of a room message, reduced to what the dispatcher cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    /// Any other `msgtype` (notice, emote, image, ...).
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessage {
    pub room_id: String,
    pub sender: String,
    pub body: String,
    pub kind: MessageKind,
}

/// An event delivered by the transport, consumed exactly once by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingEvent {
    RoomInvite {
        room_id: String,
    },
    RoomMessage {
        event_id: Option<String>,
        message: RoomMessage,
    },
}

impl IncomingEvent {
    pub fn event_id(&self) -> Option<&str> {
        match self {
            IncomingEvent::RoomInvite { .. } => None,
            IncomingEvent::RoomMessage { event_id, .. } => event_id.as_deref(),
        }
    }
}

/// Result of a single webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Delivered(u16),
    Failed(String),
}

impl WebhookOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, WebhookOutcome::Delivered(_))
    }
}

/// Why a message did not lead to a webhook call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotText,
    NoPrefix,
    EmptyCommand,
    UnknownSender,
    NotPermitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ignored(IgnoreReason),
    /// Authorized command without a registered webhook.
    MissingWebhook(String),
    Invoked {
        command: String,
        outcome: WebhookOutcome,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRecord {
    Recorded,
    AlreadyRecorded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    Joined(JoinRecord),
    /// Joined, but the membership file could not be updated.
    JoinedNotRecorded(String),
    JoinFailed(String),
}
