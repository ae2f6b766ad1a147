use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Public base URL of this deployment (e.g. "https://bot.example.com").
/// Used to register the Telegram webhook and to build player page links.
pub static WEBHOOK_URL: Lazy<Option<String>> = Lazy::new(|| {
    env::var("WEBHOOK_URL").ok().map(|u| u.trim_end_matches('/').to_string())
});

/// Session secret carried for deployments that front the bot with a
/// session-authenticated proxy. Only its presence is checked at startup.
pub static SESSION_SECRET: Lazy<Option<String>> = Lazy::new(|| env::var("SESSION_SECRET").ok());

/// HTTP listen port for the web server (webhook + player pages).
/// Read from WEB_PORT, defaults to 5000.
pub static WEB_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("WEB_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000)
});

/// Path to the log file
/// Read from LOG_FILE environment variable, defaults to teragrab.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE").unwrap_or_else(|_| "teragrab.log".to_string()));

/// Delivery configuration
pub mod delivery {
    /// Telegram refuses URL uploads above 50 MB; anything at or above this
    /// goes to the player page instead of an inline sendVideo.
    pub const INLINE_LIMIT_BYTES: u64 = 50 * 1024 * 1024;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for outbound HTTP requests (Telegram and Terabox)
    pub const TIMEOUT_SECS: u64 = 60;

    /// Connect timeout for outbound HTTP requests
    pub const CONNECT_TIMEOUT_SECS: u64 = 15;

    pub fn timeout() -> Duration {
        Duration::from_secs(TIMEOUT_SECS)
    }

    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_TIMEOUT_SECS)
    }
}

/// Resolver configuration
pub mod resolver {
    /// Mobile Chrome UA — Terabox serves the scrape-friendly page layout to it.
    pub const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Mobile Safari/537.36";

    /// Accept-Language sent with scraping requests
    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,id;q=0.8";

    /// Attempts per resolution step. Attempts are independent and stateless;
    /// each one targets the next mirror in the list.
    pub const MAX_ATTEMPTS: usize = 3;
}
