//! Web surface: player pages, health probe, webhook setup.

pub mod player;
pub mod server;

pub use server::{create_router, run_web_server};
