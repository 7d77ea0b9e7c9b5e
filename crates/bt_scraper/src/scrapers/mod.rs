use async_trait::async_trait;
use bt_core::{Article, Result, ScrapeResult};
use chrono::{DateTime, Utc};

use crate::logging::Logger;

pub mod bulletin;

pub use bulletin::BulletinScraper;
pub use utils::FieldExtractor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    pub name: &'static str,
    pub emoji: &'static str,
    /// Origin of the source site, used for attribution links.
    pub home: String,
}

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the name, emoji and home page of the source
    fn source_metadata(&self) -> SourceMetadata;

    /// Downloads the raw markup of the source page
    async fn fetch_page(&self) -> Result<String>;

    /// Extracts the articles from the markup, in page order. Never fails:
    /// fields missing from the markup come back empty.
    fn extract(&self, html: &str) -> Vec<Article>;

    /// One fetch and one extraction pass, stamped with `timestamp`.
    async fn scrape_at(&self, timestamp: DateTime<Utc>) -> Result<ScrapeResult> {
        let meta = self.source_metadata();
        let logger = Logger::new()
            .with_prefix(meta.emoji.to_string())
            .with_prefix(format!("[{}]", meta.name));

        logger.info(&format!("Scrape called at: {}", bt_core::types::format_timestamp(&timestamp)));

        let html = match self.fetch_page().await {
            Ok(html) => html,
            Err(e) => {
                logger.error(&format!("Scraping error: {}", e));
                return Err(e);
            }
        };
        logger.debug(&format!("Fetched {} bytes", html.len()));

        let articles = self.extract(&html);
        logger.info(&format!("Found {} articles", articles.len()));
        if articles.is_empty() {
            logger.debug("No article containers matched, the page markup may have changed");
        }

        Ok(ScrapeResult { timestamp, articles })
    }

    async fn scrape(&self) -> Result<ScrapeResult> {
        self.scrape_at(Utc::now()).await
    }
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use bt_core::{Error, Result};
    use scraper::{ElementRef, Selector};
    use url::Url;

    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| Error::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })
    }

    /// Reads one optional field out of a container element. Absence of the
    /// element or of the attribute yields an empty string.
    #[derive(Debug, Clone)]
    pub enum FieldExtractor {
        /// Text of every match, concatenated and trimmed.
        Text(Selector),
        /// Attribute of the first match.
        Attr { selector: Selector, attr: &'static str },
    }

    impl FieldExtractor {
        pub fn text(selector: &str) -> Result<Self> {
            Ok(Self::Text(parse_selector(selector)?))
        }

        pub fn attr(selector: &str, attr: &'static str) -> Result<Self> {
            Ok(Self::Attr {
                selector: parse_selector(selector)?,
                attr,
            })
        }

        pub fn extract(&self, element: &ElementRef<'_>) -> String {
            match self {
                Self::Text(selector) => element
                    .select(selector)
                    .flat_map(|el| el.text())
                    .collect::<String>()
                    .trim()
                    .to_string(),
                Self::Attr { selector, attr } => element
                    .select(selector)
                    .next()
                    .and_then(|el| el.value().attr(attr))
                    .map(|value| value.trim().to_string())
                    .unwrap_or_default(),
            }
        }
    }

    /// Makes `raw` absolute against `base`. Empty input stays empty and
    /// anything that does not resolve is returned untouched.
    pub fn resolve_url(base: &Url, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        base.join(raw)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::utils::{self, FieldExtractor};
    use super::*;
    use bt_core::Error;
    use scraper::{Html, Selector};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use url::Url;

    fn first<'a>(document: &'a Html, selector: &str) -> scraper::ElementRef<'a> {
        document
            .select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap()
    }

    #[test]
    fn test_parse_selector() {
        assert!(utils::parse_selector(".title").is_ok());
        assert!(matches!(
            utils::parse_selector("div[[["),
            Err(Error::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_text_extractor_joins_matches() {
        let document = Html::parse_fragment(
            r#"<div id="c"><p> First </p><p>Second </p></div>"#,
        );
        let container = first(&document, "#c");
        let extractor = FieldExtractor::text("p").unwrap();
        assert_eq!(extractor.extract(&container), "First Second");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let document = Html::parse_fragment(r#"<div id="c"><img alt="no src"></div>"#);
        let container = first(&document, "#c");
        assert_eq!(FieldExtractor::text("h1").unwrap().extract(&container), "");
        assert_eq!(FieldExtractor::attr("img", "src").unwrap().extract(&container), "");
        assert_eq!(
            FieldExtractor::attr(".aeroBtn", "data-url").unwrap().extract(&container),
            ""
        );
    }

    #[test]
    fn test_attr_extractor_reads_first_match() {
        let document = Html::parse_fragment(
            r#"<div id="c"><img src="/a.jpg"><img src="/b.jpg"></div>"#,
        );
        let container = first(&document, "#c");
        assert_eq!(
            FieldExtractor::attr("img", "src").unwrap().extract(&container),
            "/a.jpg"
        );
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://www.yiddish24.com/cat/57").unwrap();
        assert_eq!(utils::resolve_url(&base, ""), "");
        assert_eq!(
            utils::resolve_url(&base, "/uploads/a.jpg"),
            "https://www.yiddish24.com/uploads/a.jpg"
        );
        assert_eq!(
            utils::resolve_url(&base, "https://cdn.example.com/x.mp3"),
            "https://cdn.example.com/x.mp3"
        );
    }

    struct CountingScraper {
        fetches: AtomicUsize,
        fail: bool,
        page: &'static str,
    }

    impl CountingScraper {
        fn serving(page: &'static str) -> Self {
            Self { fetches: AtomicUsize::new(0), fail: false, page }
        }

        fn failing() -> Self {
            Self { fetches: AtomicUsize::new(0), fail: true, page: "" }
        }
    }

    #[async_trait]
    impl Scraper for CountingScraper {
        fn source_metadata(&self) -> SourceMetadata {
            SourceMetadata {
                name: "Counting",
                emoji: "🧮",
                home: "https://example.com/".to_string(),
            }
        }

        async fn fetch_page(&self) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Fetch {
                    url: "https://example.com/".to_string(),
                    status: 500,
                })
            } else {
                Ok(self.page.to_string())
            }
        }

        fn extract(&self, html: &str) -> Vec<Article> {
            let document = Html::parse_document(html);
            let selector = Selector::parse("h1").unwrap();
            document
                .select(&selector)
                .map(|el| Article {
                    title: el.text().collect(),
                    ..Default::default()
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn test_scrape_at_keeps_timestamp() {
        let scraper = CountingScraper::serving("<h1>one</h1><h1>two</h1>");
        let timestamp = Utc::now();
        let result = scraper.scrape_at(timestamp).await.unwrap();
        assert_eq!(result.timestamp, timestamp);
        assert_eq!(result.articles.len(), 2);
        assert_eq!(result.articles[1].title, "two");
    }

    #[tokio::test]
    async fn test_scrape_does_not_retry() {
        let scraper = CountingScraper::failing();
        let result = scraper.scrape().await;
        assert!(matches!(result, Err(Error::Fetch { status: 500, .. })));
        assert_eq!(scraper.fetches.load(Ordering::SeqCst), 1);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    async fn scrape_with_logs(scraper: &CountingScraper) -> (Result<ScrapeResult>, Vec<String>) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let result = scraper.scrape().await;
        (result, logs.lines())
    }

    #[tokio::test]
    async fn test_scrape_logs_call_and_count() {
        let scraper = CountingScraper::serving("<h1>one</h1><h1>two</h1>");
        let (result, lines) = scrape_with_logs(&scraper).await;
        assert!(result.is_ok());
        assert_eq!(lines.len(), 2, "{:?}", lines);
        assert!(lines[0].contains("INFO") && lines[0].contains("[Counting] Scrape called at:"));
        assert!(lines[1].contains("INFO") && lines[1].contains("Found 2 articles"));
    }

    #[tokio::test]
    async fn test_empty_scrape_logs_two_lines() {
        let scraper = CountingScraper::serving("<p>no headings</p>");
        let (result, lines) = scrape_with_logs(&scraper).await;
        assert!(result.unwrap().articles.is_empty());
        assert_eq!(lines.len(), 2, "{:?}", lines);
        assert!(lines[1].contains("Found 0 articles"));
    }

    #[tokio::test]
    async fn test_failed_scrape_logs_error() {
        let scraper = CountingScraper::failing();
        let (result, lines) = scrape_with_logs(&scraper).await;
        assert!(result.is_err());
        assert_eq!(lines.len(), 2, "{:?}", lines);
        assert!(lines[0].contains("INFO") && lines[0].contains("Scrape called at:"));
        assert!(lines[1].contains("ERROR") && lines[1].contains("Scraping error:"));
        assert!(lines[1].contains("upstream returned 500"));
    }
}
