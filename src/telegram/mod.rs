//! Telegram bot integration: bot creation, command routing, progress UI,
//! and the delivery dispatcher.

pub mod bot;
pub mod delivery;
pub mod handlers;
pub mod progress;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::schema;
