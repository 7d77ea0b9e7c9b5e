use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use bt_core::ApiResponse;
use chrono::Utc;

use crate::page::render_page;
use crate::view::DisplayState;
use crate::AppState;

pub const SCRAPE_FAILED: &str = "Failed to scrape website";

/// `GET /api/scrape`: one scrape, answered as JSON. Every failure becomes a
/// 500 carrying the generic message; the cause is only logged.
pub async fn scrape(State(state): State<Arc<AppState>>) -> Response {
    let timestamp = Utc::now();
    match state.scraper.scrape_at(timestamp).await {
        Ok(result) => (StatusCode::OK, Json(ApiResponse::success(result))).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure(&timestamp, SCRAPE_FAILED)),
        )
            .into_response(),
    }
}

/// `GET /view`: the display state after one round trip to the endpoint.
/// Each request renders a fresh state; overlapping refreshes are held back
/// by the page script.
pub async fn view(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut display = DisplayState::default();
    display.apply(state.client.fetch().await);
    Html(display.render(&state.scraper.source_metadata().home))
}

/// `GET /`
pub async fn index() -> Html<String> {
    Html(render_page())
}
