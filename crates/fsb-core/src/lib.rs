//! Core domain + application logic for the file share bot.
//!
//! This crate is framework-agnostic. Telegram and the keep-alive HTTP server
//! live in adapter crates; the platform is reached through `MessagingPort`.

pub mod catalog;
pub mod config;
pub mod deletion;
pub mod delivery;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod publisher;
pub mod relay;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, PlatformErrorKind, Result};
