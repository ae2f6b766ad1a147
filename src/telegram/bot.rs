//! Bot instance creation and command definitions.

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "I can:")]
pub enum Command {
    #[command(description = "welcome message and usage")]
    Start,
    #[command(description = "show this help message")]
    Help,
    #[command(description = "about this bot")]
    About,
}

/// Creates a Bot instance with custom or default API URL.
///
/// Token comes from `TELEGRAM_BOT_TOKEN` (or teloxide's own
/// `TELOXIDE_TOKEN`); an optional `BOT_API_URL` points at a self-hosted Bot
/// API server.
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = std::env::var("TELEGRAM_BOT_TOKEN")
        .or_else(|_| std::env::var("TELOXIDE_TOKEN"))
        .map_err(|_| anyhow::anyhow!("TELEGRAM_BOT_TOKEN environment variable is not set"))?;

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;

    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        Bot::with_client(token, client).set_api_url(url)
    } else {
        Bot::with_client(token, client)
    };

    Ok(bot)
}

/// Sets up bot commands in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
