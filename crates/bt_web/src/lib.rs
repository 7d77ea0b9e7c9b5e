use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use bt_core::{Result, ServerConfig};
use bt_scraper::Scraper;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

pub mod client;
pub mod handlers;
pub mod page;
pub mod state;
pub mod view;

pub use client::EndpointClient;
pub use state::AppState;

/// Extra time the display client waits beyond the scraper's own timeout, so
/// an upstream timeout still reaches the page as the endpoint's error JSON.
pub const CLIENT_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

pub fn client_timeout(scraper_timeout: Duration) -> Duration {
    scraper_timeout.saturating_add(CLIENT_TIMEOUT_MARGIN)
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();
    let no_store = SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );

    Router::new()
        .route("/", get(handlers::index))
        .route("/view", get(handlers::view))
        .route("/api/scrape", get(handlers::scrape))
        .layer(no_store)
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `config.bind` and serves until the process is stopped. The display
/// page reaches the endpoint through `config.public_url`, or through the
/// bound address when that is unset.
pub async fn serve(
    config: ServerConfig,
    scraper: Arc<dyn Scraper>,
    scraper_timeout: Duration,
) -> Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    let local = listener.local_addr()?;
    let config = ServerConfig {
        bind: local,
        ..config
    };
    let base = config.endpoint_base()?;
    let client = EndpointClient::new(&base, client_timeout(scraper_timeout))?;

    info!("🌐 Serving on http://{} (endpoint {})", local, client.endpoint());
    let app = create_app(AppState::new(scraper, client));
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, AppState, EndpointClient};
    pub use bt_core::{ApiResponse, Article, Error, Result};
}
