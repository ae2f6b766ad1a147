//! Delivery dispatcher: inline video versus player page.
//!
//! Single synchronous decision per resolved link. Files below Telegram's
//! 50 MB URL-upload limit are sent inline with `sendVideo`; everything else
//! gets a link to the self-hosted player page.

use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};

use crate::core::utils::format_file_size;
use crate::core::{config, AppResult};
use crate::resolver::ResolvedMedia;

/// How a resolved media item should reach the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryPlan {
    /// Send the video inline via sendVideo-by-URL
    Inline,
    /// Answer with a player page link
    PlayerPage,
}

/// Decide the delivery route. Strictly below the threshold goes inline;
/// exactly at the limit goes to the player page (conservative against
/// Telegram's hard cap). Unknown sizes (zero) go inline — the URL is
/// already signed and Telegram rejects it itself if too large.
pub fn plan(media: &ResolvedMedia) -> DeliveryPlan {
    if media.size_bytes < config::delivery::INLINE_LIMIT_BYTES {
        DeliveryPlan::Inline
    } else {
        DeliveryPlan::PlayerPage
    }
}

/// Build the player page URL for a resolved media item.
///
/// The token is a cosmetic path segment (the share token when known); the
/// metadata the page needs travels in the query string.
pub fn player_page_url(base: &str, token: &str, media: &ResolvedMedia) -> String {
    format!(
        "{}/player/{}?url={}&filename={}&size={}",
        base.trim_end_matches('/'),
        urlencoding::encode(token),
        urlencoding::encode(&media.direct_url),
        urlencoding::encode(&media.filename),
        media.size_bytes,
    )
}

/// HTML caption attached to inline videos.
fn build_caption(media: &ResolvedMedia) -> String {
    format!(
        "📹 <b>{name}</b> ({size})\n\n\
         📥 <a href=\"{url}\">Download link</a>\n\n\
         <i>Direct link expires in a few hours.</i>",
        name = teloxide::utils::html::escape(&media.filename),
        size = format_file_size(media.size_bytes),
        url = media.direct_url,
    )
}

/// Message sent when the file is too large for inline delivery.
fn build_player_message(media: &ResolvedMedia, player_url: &str) -> String {
    format!(
        "🎬 <b>{name}</b> ({size})\n\n\
         ▶️ <a href=\"{player}\">Watch in the web player</a>\n\
         📥 <a href=\"{url}\">Direct download link</a>\n\n\
         <i>⚠️ The file is too large to send through Telegram (max 50MB). \
         The links above expire in a few hours.</i>",
        name = teloxide::utils::html::escape(&media.filename),
        size = format_file_size(media.size_bytes),
        player = player_url,
        url = media.direct_url,
    )
}

/// Fallback message when no player base URL is configured.
fn build_link_message(media: &ResolvedMedia) -> String {
    format!(
        "✅ <b>Download link generated</b>\n\n\
         <b>Filename:</b> {name}\n\
         <b>Size:</b> {size}\n\n\
         📥 <a href=\"{url}\">{name}</a>\n\n\
         <i>⚠️ This direct link expires in a few hours. Download soon!</i>",
        name = teloxide::utils::html::escape(&media.filename),
        size = format_file_size(media.size_bytes),
        url = media.direct_url,
    )
}

/// Deliver a resolved media item to a chat.
///
/// Inline failures (Telegram rejecting the URL upload) degrade to the
/// player/link message instead of surfacing an error to the user.
pub async fn deliver(bot: &Bot, chat_id: ChatId, media: &ResolvedMedia, token: &str) -> AppResult<()> {
    match plan(media) {
        DeliveryPlan::Inline => {
            let video_url = url::Url::parse(&media.direct_url)?;
            let send = bot
                .send_video(chat_id, InputFile::url(video_url))
                .caption(build_caption(media))
                .parse_mode(ParseMode::Html)
                .await;

            match send {
                Ok(_) => {
                    log::info!("Sent {} inline to {}", media.filename, chat_id);
                    Ok(())
                }
                Err(e) => {
                    log::warn!(
                        "Inline send of {} to {} failed ({}), falling back to links",
                        media.filename,
                        chat_id,
                        e
                    );
                    send_player_link(bot, chat_id, media, token).await
                }
            }
        }
        DeliveryPlan::PlayerPage => send_player_link(bot, chat_id, media, token).await,
    }
}

async fn send_player_link(bot: &Bot, chat_id: ChatId, media: &ResolvedMedia, token: &str) -> AppResult<()> {
    let text = match *config::WEBHOOK_URL {
        Some(ref base) => build_player_message(media, &player_page_url(base, token, media)),
        None => build_link_message(media),
    };

    bot.send_message(chat_id, text).parse_mode(ParseMode::Html).await?;
    log::info!("Sent player/download links for {} to {}", media.filename, chat_id);
    Ok(())
}
