//! # Application Layer
//!
//! Contains the core logic of the bot: the access tables, the membership store,
//! the invite and message handlers, and the sequential event loop that drives them.

pub mod access;
pub mod dispatcher;
pub mod event_loop;
pub mod invite;
pub mod logging;
pub mod membership;
