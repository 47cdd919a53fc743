//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (ChatTransport, WebhookInvoker).

pub mod matrix;
pub mod webhook;
