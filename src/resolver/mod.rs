//! Terabox link resolution pipeline.
//!
//! Turns a share URL on any recognized Terabox mirror into a `ResolvedMedia`:
//! a time-limited direct media URL plus filename and size. Resolution is
//! stateless and per-request — direct URLs expire within hours on the
//! provider side, so nothing is cached here.

pub mod share_link;
pub mod terabox;

pub use share_link::{extract_share_url, ShareLink, TeraboxDomain};
pub use terabox::TeraboxResolver;

use thiserror::Error;

/// Errors surfaced by the resolution pipeline.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The URL host is not a recognized Terabox domain or mirror.
    /// Raised before any outbound request is made.
    #[error("unsupported domain: {host}")]
    UnsupportedDomain { host: String },

    /// The fetched page or API response did not contain the expected
    /// markers (share info, sign, download link).
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Transport failure talking to Terabox or the sign service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The submitted text did not contain a parseable URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Media file classification by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Audio,
    Image,
    Other,
}

impl FileKind {
    /// Classify a filename by its extension.
    pub fn from_filename(name: &str) -> Self {
        let name = name.to_lowercase();
        const VIDEO: &[&str] = &[".mp4", ".mkv", ".avi", ".mov", ".flv", ".webm"];
        const AUDIO: &[&str] = &[".mp3", ".wav", ".flac", ".ogg", ".m4a"];
        const IMAGE: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

        if VIDEO.iter().any(|ext| name.ends_with(ext)) {
            FileKind::Video
        } else if AUDIO.iter().any(|ext| name.ends_with(ext)) {
            FileKind::Audio
        } else if IMAGE.iter().any(|ext| name.ends_with(ext)) {
            FileKind::Image
        } else {
            FileKind::Other
        }
    }
}

/// Outcome of a successful resolution: a provider-signed direct URL and the
/// file metadata needed for delivery decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// Time-limited direct media URL
    pub direct_url: String,
    /// Server-side filename ("abc123.mp4")
    pub filename: String,
    /// File size in bytes
    pub size_bytes: u64,
}

impl ResolvedMedia {
    pub fn kind(&self) -> FileKind {
        FileKind::from_filename(&self.filename)
    }
}
