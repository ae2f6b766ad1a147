//! Logging initialization and startup configuration checking

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs environment configuration at application startup.
///
/// Reports which of TELEGRAM_BOT_TOKEN / WEBHOOK_URL / SESSION_SECRET are
/// set. Values are never printed.
pub fn log_environment_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Environment configuration check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if std::env::var("TELOXIDE_TOKEN").is_ok() || std::env::var("TELEGRAM_BOT_TOKEN").is_ok() {
        log::info!("✅ Bot token: set");
    } else {
        log::error!("❌ Bot token: NOT SET — set TELEGRAM_BOT_TOKEN (or TELOXIDE_TOKEN)");
    }

    match *config::WEBHOOK_URL {
        Some(ref url) => log::info!("✅ WEBHOOK_URL: {}", url),
        None => log::warn!("⚠️  WEBHOOK_URL: not set — webhook mode and player links unavailable"),
    }

    if config::SESSION_SECRET.is_some() {
        log::info!("✅ SESSION_SECRET: set");
    } else {
        log::warn!("⚠️  SESSION_SECRET: not set");
    }

    log::info!("Web server port: {}", *config::WEB_PORT);
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_rejects_bad_path() {
        // Directory that does not exist — File::create must fail.
        let result = init_logger("/nonexistent-dir-teragrab/out.log");
        assert!(result.is_err());
    }
}
