pub mod config;
pub mod error;
pub mod types;

pub use config::{ScraperConfig, Selectors, ServerConfig};
pub use error::{Error, Result};
pub use types::{ApiResponse, Article, ScrapeResult};
