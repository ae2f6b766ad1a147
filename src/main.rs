use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tokio::net::TcpListener;

use teragrab::cli::{Cli, Commands};
use teragrab::core::{config, init_logger, log_environment_configuration};
use teragrab::resolver::{ShareLink, TeraboxResolver};
use teragrab::telegram::{create_bot, schema, setup_bot_commands};
use teragrab::web;

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, bot creation, binding).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logger(&config::LOG_FILE_PATH)?;

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Some(Commands::Run { webhook }) => {
            log::info!("Running bot (webhook: {})", webhook);
            run_bot(webhook).await
        }
        Some(Commands::Resolve { url, json }) => run_cli_resolve(url, json).await,
        None => {
            log::info!("No command specified, running bot in long-polling mode");
            run_bot(false).await
        }
    }
}

/// Run the bot, either with a webhook listener or long polling. The web
/// server (player pages, health, setup) runs in both modes.
async fn run_bot(webhook: bool) -> Result<()> {
    log_environment_configuration();

    let bot = create_bot()?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let resolver = Arc::new(TeraboxResolver::new());
    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![resolver])
        .enable_ctrlc_handler()
        .build();

    let addr = SocketAddr::from(([0, 0, 0, 0], *config::WEB_PORT));

    if webhook {
        let base = config::WEBHOOK_URL
            .clone()
            .ok_or_else(|| anyhow::anyhow!("WEBHOOK_URL must be set for webhook mode"))?;
        let endpoint = url::Url::parse(&format!("{}/webhook/{}", base, bot.token()))?;

        let (listener, stop_flag, webhook_router) =
            webhooks::axum_to_router(bot.clone(), webhooks::Options::new(addr, endpoint)).await?;

        // One socket carries the webhook and the player/health/setup routes
        let app = web::create_router(bot.clone()).merge(webhook_router);
        let tcp = TcpListener::bind(addr).await?;
        log::info!("Webhook server listening on http://{}", addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(tcp, app).with_graceful_shutdown(stop_flag).await {
                log::error!("Web server error: {}", e);
            }
        });

        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;
    } else {
        // Drop any stale webhook so getUpdates polling works
        if let Err(e) = bot.delete_webhook().await {
            log::warn!("Failed to delete webhook before polling: {}", e);
        }

        let web_bot = bot.clone();
        tokio::spawn(async move {
            if let Err(e) = web::run_web_server(*config::WEB_PORT, web_bot).await {
                log::error!("Web server error: {}", e);
            }
        });

        dispatcher.dispatch().await;
    }

    Ok(())
}

/// Resolve a link from the terminal and print the result.
async fn run_cli_resolve(url: String, json: bool) -> Result<()> {
    let resolver = TeraboxResolver::new();
    let link = ShareLink::parse(&url)?;
    let media = resolver.resolve(&link).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "filename": media.filename,
                "size_bytes": media.size_bytes,
                "direct_url": media.direct_url,
            })
        );
    } else {
        println!("Filename:  {}", media.filename);
        println!(
            "Size:      {}",
            teragrab::core::utils::format_file_size(media.size_bytes)
        );
        println!("Direct URL: {}", media.direct_url);
    }

    Ok(())
}
