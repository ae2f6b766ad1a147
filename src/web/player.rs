//! HTML player page rendering.
//!
//! Pure string rendering: identical (filename, size, url) inputs produce
//! byte-identical HTML. No server-side state is touched.

use url::Url;

use crate::core::utils::{format_file_size, html_escape};
use crate::resolver::TeraboxDomain;

/// True if a media URL is allowed on the player page: a recognized Terabox
/// host or one of the workers.dev wrapper redirectors.
pub fn is_allowed_media_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };

    TeraboxDomain::from_host(host).is_some() || host.to_lowercase().ends_with(".workers.dev")
}

/// Render the player page for a resolved media URL.
pub fn render_player_page(filename: &str, size_bytes: u64, video_url: &str) -> String {
    let title = html_escape(filename);
    let size = format_file_size(size_bytes);
    let src = html_escape(video_url);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} — Player</title>
<style>
*{{box-sizing:border-box;margin:0;padding:0}}
body{{background:#0d0d0d;min-height:100vh;display:flex;justify-content:center;align-items:center;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;padding:20px}}
.card{{background:rgba(255,255,255,.06);border:1px solid rgba(255,255,255,.12);border-radius:24px;padding:24px;max-width:860px;width:100%;text-align:center;color:#fff}}
video{{width:100%;border-radius:16px;box-shadow:0 8px 40px rgba(0,0,0,.6);margin-bottom:20px;display:block;background:#000}}
h1{{font-size:1.2rem;font-weight:700;line-height:1.3;margin-bottom:4px;word-break:break-all}}
.size{{color:rgba(255,255,255,.5);font-size:.85rem;margin-bottom:20px}}
.btn{{display:inline-block;padding:10px 24px;border-radius:50px;text-decoration:none;font-weight:600;font-size:.9rem;background:#1DB954;color:#000;transition:opacity .15s}}
.btn:hover{{opacity:.85}}
.disclaimer{{color:rgba(255,255,255,.35);font-size:.75rem;line-height:1.4;margin-top:20px}}
</style>
</head>
<body>
<div class="card">
<video controls playsinline preload="metadata" src="{src}"></video>
<h1>{title}</h1>
<p class="size">{size}</p>
<a class="btn" href="{src}" download="{title}">Download</a>
<p class="disclaimer">Direct links are provider-signed and expire within a few hours.<br>Content belongs to respective rights holders.</p>
</div>
</body>
</html>"#,
        title = title,
        size = size,
        src = src,
    )
}
