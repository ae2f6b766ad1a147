//! Public-facing web server.
//!
//! Serves the player page, the health probe, and the webhook setup
//! endpoint. In webhook mode the teloxide update listener's router is
//! merged in so one listener socket carries everything.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use teloxide::prelude::*;
use tokio::net::TcpListener;

use crate::core::config;
use crate::web::player;

/// Shared state for the web server.
#[derive(Clone)]
pub struct WebState {
    pub bot: Bot,
}

/// Build the application router.
pub fn create_router(bot: Bot) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/setup", get(setup_handler))
        .route("/player/{token}", get(player_handler))
        .with_state(WebState { bot })
}

/// Start the web server on its own (long-polling mode). Webhook mode merges
/// the listener router and serves from `main` instead.
pub async fn run_web_server(port: u16, bot: Bot) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = create_router(bot);

    log::info!("Starting web server on http://{}", addr);
    log::info!("  /player/{{token}} - video player page");
    log::info!("  /setup           - webhook registration");
    log::info!("  /health          - health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// GET /setup — (re)register the webhook URL with the Telegram API.
async fn setup_handler(State(state): State<WebState>) -> Response {
    let Some(ref base) = *config::WEBHOOK_URL else {
        return (
            StatusCode::PRECONDITION_FAILED,
            Json(json!({ "status": "error", "message": "WEBHOOK_URL is not set" })),
        )
            .into_response();
    };

    let endpoint = format!("{}/webhook/{}", base, state.bot.token());
    let url = match url::Url::parse(&endpoint) {
        Ok(url) => url,
        Err(e) => {
            return (
                StatusCode::PRECONDITION_FAILED,
                Json(json!({ "status": "error", "message": format!("Invalid webhook URL: {}", e) })),
            )
                .into_response();
        }
    };

    log::info!("Setting webhook URL: {}/webhook/<token>", base);

    match state.bot.set_webhook(url).await {
        Ok(_) => Json(json!({ "status": "success", "message": "Webhook set successfully" })).into_response(),
        Err(e) => {
            log::error!("Failed to set webhook: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "status": "error", "message": format!("Failed to set webhook: {}", e) })),
            )
                .into_response()
        }
    }
}

/// Query parameters for the player page.
#[derive(Debug, Deserialize)]
struct PlayerQuery {
    url: Option<String>,
    filename: Option<String>,
    size: Option<u64>,
}

/// GET /player/{token} — render the video player page.
///
/// The token path segment is cosmetic; the metadata travels in the query
/// string. Non-Terabox media URLs are rejected.
async fn player_handler(Path(token): Path<String>, Query(query): Query<PlayerQuery>) -> Response {
    let Some(ref video_url) = query.url else {
        return (StatusCode::BAD_REQUEST, Html("<h1>Missing video URL</h1>".to_string())).into_response();
    };

    if !player::is_allowed_media_url(video_url) {
        log::warn!("Rejected player request for non-Terabox URL (token {})", token);
        return (
            StatusCode::BAD_REQUEST,
            Html("<h1>Only Terabox media URLs can be played here</h1>".to_string()),
        )
            .into_response();
    }

    let filename = query.filename.as_deref().unwrap_or("Video");
    let size_bytes = query.size.unwrap_or(0);

    Html(player::render_player_page(filename, size_bytes, video_url)).into_response()
}
