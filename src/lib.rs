//! Teragrab - Telegram bot for resolving Terabox share links
//!
//! This library provides all the functionality for the bot: share URL
//! recognition, the Terabox extraction pipeline, delivery dispatching, and
//! the web player server.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, shared helpers
//! - `resolver`: share link parsing and the Terabox extraction engine
//! - `telegram`: bot integration, message handlers, delivery dispatcher
//! - `web`: axum server for player pages, health, and webhook setup

pub mod cli;
pub mod core;
pub mod resolver;
pub mod telegram;
pub mod web;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use crate::resolver::{ResolveError, ResolvedMedia, ShareLink, TeraboxDomain, TeraboxResolver};
