//! # Messages
//!
//! Text the bot posts into rooms. Rooms only ever see the success acknowledgement.

pub const DEFAULT_ACKNOWLEDGEMENT: &str = "✅ Command received, webhook triggered.";
