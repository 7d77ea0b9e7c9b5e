use std::sync::Arc;

use bt_scraper::Scraper;

use crate::client::EndpointClient;

pub struct AppState {
    pub scraper: Arc<dyn Scraper>,
    pub client: EndpointClient,
}

impl AppState {
    pub fn new(scraper: Arc<dyn Scraper>, client: EndpointClient) -> Self {
        Self { scraper, client }
    }
}
