//! Core utilities: configuration, errors, logging, and shared helpers.

pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_environment_configuration};
