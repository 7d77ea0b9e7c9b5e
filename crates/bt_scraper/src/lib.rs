pub mod logging;
pub mod scrapers;

pub use logging::{init_logging, Logger};
pub use scrapers::{BulletinScraper, FieldExtractor, Scraper, SourceMetadata};

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use bt_core::{Article, Error, Result, ScrapeResult};
}
