//! # Strings Module
//!
//! Centralizes log lines and user-facing text.
//! Keeps wording consistent across the handlers and the startup code.

pub mod logs;
pub mod messages;
