//! Message routing and the link-resolution flow.
//!
//! Webhook/polling updates land here: commands get static answers, text
//! messages are scanned for a Terabox link and pushed through the resolver,
//! anything else gets usage guidance.

use std::sync::Arc;

use teloxide::dispatching::{HandlerExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::resolver::{extract_share_url, ResolveError, ShareLink, TeraboxResolver};
use crate::telegram::bot::Command;
use crate::telegram::delivery;
use crate::telegram::progress::ProcessingMessage;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Build the dptree update handler: command branch first, then free text.
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message()
        .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
        .branch(dptree::endpoint(handle_message))
}

/// Handle bot commands.
pub async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> HandlerResult {
    let text = match cmd {
        Command::Start => {
            "👋 <b>Welcome to the Terabox Downloader Bot!</b>\n\n\
             Send me a Terabox share link and I'll fetch the video for you. \
             Small files arrive right here in the chat; larger ones (over 50MB) \
             get a web player link instead.\n\n\
             Type /help to see available commands."
        }
        Command::Help => {
            "📖 <b>Terabox Downloader Bot — Help</b>\n\n\
             <b>Available commands:</b>\n\
             /start - start the bot\n\
             /help - show this help message\n\
             /about - about this bot\n\n\
             <b>How to use:</b>\n\
             1. Send me a Terabox link\n\
             2. Wait a moment while I process it\n\
             3. I'll send the video directly, or a player link for files over 50MB\n\n\
             <i>Note: direct links expire in a few hours</i>"
        }
        Command::About => {
            "ℹ️ <b>About Terabox Downloader Bot</b>\n\n\
             This bot resolves Terabox share pages into direct video links, \
             so you can watch or download without going through the Terabox website.\n\n\
             Files over 50MB are served through a web player page instead of \
             being sent inline."
        }
    };

    bot.send_message(msg.chat.id, text).parse_mode(ParseMode::Html).await?;
    Ok(())
}

/// Handle free-form messages: find a Terabox link and resolve it.
pub async fn handle_message(bot: Bot, msg: Message, resolver: Arc<TeraboxResolver>) -> HandlerResult {
    let chat_id = msg.chat.id;

    let Some(text) = msg.text() else {
        bot.send_message(
            chat_id,
            "I can only process text messages. Please send me a Terabox link.",
        )
        .await?;
        return Ok(());
    };

    let Some(raw_url) = extract_share_url(text) else {
        bot.send_message(
            chat_id,
            "Please send me a Terabox link to extract the direct download URL.\n\n\
             Type /help to see available commands.",
        )
        .await?;
        return Ok(());
    };

    log::info!("Processing Terabox link from {}: {}", chat_id, raw_url);
    process_share_link(&bot, chat_id, &resolver, &raw_url).await;
    Ok(())
}

/// Run one link through the resolution pipeline with progress updates.
///
/// Resolver errors become user-visible guidance; Telegram transport errors
/// while delivering are logged and the user sees a generic failure note.
async fn process_share_link(bot: &Bot, chat_id: ChatId, resolver: &TeraboxResolver, raw_url: &str) {
    let link = match ShareLink::parse(raw_url) {
        Ok(link) => link,
        Err(e) => {
            let _ = bot
                .send_message(chat_id, user_message(&e))
                .parse_mode(ParseMode::Html)
                .await;
            return;
        }
    };

    let progress = ProcessingMessage::send(bot, chat_id).await;

    if let Some(ref p) = progress {
        p.update(bot, 30).await;
    }

    let media = match resolver.resolve(&link).await {
        Ok(media) => media,
        Err(e) => {
            log::warn!("Resolution failed for {}: {}", raw_url, e);
            let text = user_message(&e);
            match progress {
                Some(p) => p.fail(bot, &text).await,
                None => {
                    let _ = bot.send_message(chat_id, text).parse_mode(ParseMode::Html).await;
                }
            }
            return;
        }
    };

    if let Some(ref p) = progress {
        p.update(bot, 70).await;
    }

    let token = link.surl().unwrap_or("direct");
    match delivery::deliver(bot, chat_id, &media, token).await {
        Ok(()) => {
            if let Some(p) = progress {
                p.update(bot, 100).await;
                p.finish(bot).await;
            }
        }
        Err(e) => {
            log::error!("Delivery to {} failed: {}", chat_id, e);
            let text = "❌ <b>Error:</b> could not deliver the video. Please try again later.";
            match progress {
                Some(p) => p.fail(bot, text).await,
                None => {
                    let _ = bot.send_message(chat_id, text).parse_mode(ParseMode::Html).await;
                }
            }
        }
    }
}

/// Map resolver errors to user-facing guidance.
fn user_message(err: &ResolveError) -> String {
    match err {
        ResolveError::UnsupportedDomain { host } => format!(
            "❌ <b>{}</b> is not a Terabox domain I recognize.\n\n\
             Please send a link from terabox.com or one of its mirrors.",
            teloxide::utils::html::escape(host)
        ),
        ResolveError::Extraction(_) => "❌ Could not extract a download link from that share. \
             Terabox pages change often — please try again in a minute."
            .to_string(),
        ResolveError::Http(_) => "❌ Terabox did not respond. Please try again in a minute.".to_string(),
        ResolveError::Url(_) => "❌ Could not find a valid Terabox link in your message. \
             Please make sure the URL is correct."
            .to_string(),
    }
}
