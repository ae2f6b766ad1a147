//! Animated processing message shown while a link resolves.
//!
//! One message is sent when resolution starts, edited as the pipeline
//! advances, and deleted (or edited into an error) when it finishes.

use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

/// Length of the emoji progress bar
const BAR_LENGTH: u8 = 10;

/// Create a text-based progress bar. Block color shifts with the stage:
/// blue while fetching info, purple while signing, green when delivering.
pub fn build_progress_bar(progress: u8) -> String {
    let progress = progress.min(100);
    let filled = (BAR_LENGTH as u16 * progress as u16 / 100) as u8;
    let empty = BAR_LENGTH - filled;

    let block = if progress < 30 {
        "🟦"
    } else if progress < 70 {
        "🟪"
    } else {
        "🟩"
    };

    format!("{}{}", block.repeat(filled as usize), "⬜".repeat(empty as usize))
}

/// Render the full processing message body for a progress value.
pub fn build_processing_text(progress: u8) -> String {
    let progress = progress.min(100);
    let stage = |done: bool, active: bool| {
        if done {
            "✅"
        } else if active {
            "🔍"
        } else {
            "⏳"
        }
    };

    format!(
        "🚀 <b>Processing your Terabox link</b>\n\n\
         {bar} <b>{progress}%</b>\n\n\
         {s1} Fetching share info\n\
         {s2} Generating download link\n\
         {s3} Preparing delivery\n\n\
         <i>Please wait, your video will be ready soon...</i>",
        bar = build_progress_bar(progress),
        progress = progress,
        s1 = stage(progress >= 30, progress < 30),
        s2 = stage(progress >= 70, (30..70).contains(&progress)),
        s3 = stage(progress >= 100, (70..100).contains(&progress)),
    )
}

/// Handle to a live processing message.
pub struct ProcessingMessage {
    chat_id: ChatId,
    message_id: MessageId,
}

impl ProcessingMessage {
    /// Send the initial processing message. Returns `None` if the send
    /// failed — callers continue without progress updates in that case.
    pub async fn send(bot: &Bot, chat_id: ChatId) -> Option<Self> {
        match bot
            .send_message(chat_id, build_processing_text(0))
            .parse_mode(ParseMode::Html)
            .await
        {
            Ok(msg) => Some(Self {
                chat_id,
                message_id: msg.id,
            }),
            Err(e) => {
                log::warn!("Failed to send processing message to {}: {}", chat_id, e);
                None
            }
        }
    }

    /// Edit the message to a new progress value. Edit failures are logged
    /// and ignored — progress display is cosmetic.
    pub async fn update(&self, bot: &Bot, progress: u8) {
        if let Err(e) = bot
            .edit_message_text(self.chat_id, self.message_id, build_processing_text(progress))
            .parse_mode(ParseMode::Html)
            .await
        {
            log::warn!("Failed to update processing message in {}: {}", self.chat_id, e);
        }
    }

    /// Delete the message after a successful delivery.
    pub async fn finish(self, bot: &Bot) {
        if let Err(e) = bot.delete_message(self.chat_id, self.message_id).await {
            log::warn!("Failed to delete processing message in {}: {}", self.chat_id, e);
        }
    }

    /// Replace the message body with an error text.
    pub async fn fail(self, bot: &Bot, text: &str) {
        if bot
            .edit_message_text(self.chat_id, self.message_id, text)
            .parse_mode(ParseMode::Html)
            .await
            .is_err()
        {
            // Edit can fail if the message was deleted; fall back to a new one
            let _ = bot.send_message(self.chat_id, text).parse_mode(ParseMode::Html).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(build_progress_bar(0), "⬜".repeat(10));
        assert_eq!(build_progress_bar(100), "🟩".repeat(10));
        assert_eq!(build_progress_bar(200), "🟩".repeat(10));
    }

    #[test]
    fn test_progress_bar_stage_colors() {
        assert!(build_progress_bar(20).starts_with("🟦"));
        assert!(build_progress_bar(50).starts_with("🟪"));
        assert!(build_progress_bar(90).starts_with("🟩"));
    }

    #[test]
    fn test_processing_text_stages() {
        let start = build_processing_text(0);
        assert!(start.contains("0%"));
        assert!(start.contains("🔍 Fetching share info"));

        let mid = build_processing_text(50);
        assert!(mid.contains("✅ Fetching share info"));
        assert!(mid.contains("🔍 Generating download link"));

        let done = build_processing_text(100);
        assert!(done.contains("✅ Preparing delivery"));
    }
}
