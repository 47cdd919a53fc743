//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the application.
//! Independent of the Matrix SDK and the HTTP client, serving as the contract for other layers.

pub mod config;
pub mod paths;
pub mod traits;
pub mod types;
