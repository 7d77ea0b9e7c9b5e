use std::time::Duration;

use async_trait::async_trait;
use bt_core::{Article, Error, Result, ScraperConfig, Selectors};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use super::utils::{parse_selector, resolve_url, FieldExtractor};
use super::{Scraper, SourceMetadata};

#[derive(Debug, Clone)]
struct CompiledSelectors {
    container: Selector,
    title: FieldExtractor,
    body: FieldExtractor,
    image: FieldExtractor,
    audio: FieldExtractor,
    link: FieldExtractor,
}

impl CompiledSelectors {
    fn compile(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&selectors.container)?,
            title: FieldExtractor::text(&selectors.title)?,
            body: FieldExtractor::text(&selectors.body)?,
            image: FieldExtractor::attr(&selectors.image, "src")?,
            audio: FieldExtractor::attr(&selectors.audio, "data-url")?,
            link: FieldExtractor::attr(&selectors.link, "href")?,
        })
    }
}

/// Scrapes the bulletin listing of a single news category page.
#[derive(Debug, Clone)]
pub struct BulletinScraper {
    client: Client,
    source_url: Url,
    selectors: CompiledSelectors,
}

impl BulletinScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let source_url = config.parsed_source_url()?;
        let selectors = CompiledSelectors::compile(&config.selectors)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            source_url,
            selectors,
        })
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }
}

fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    let client = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

#[async_trait]
impl Scraper for BulletinScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: "Yiddish24",
            emoji: "📻",
            home: self.source_url.origin().ascii_serialization(),
        }
    }

    async fn fetch_page(&self) -> Result<String> {
        let response = self.client.get(self.source_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: self.source_url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    fn extract(&self, html: &str) -> Vec<Article> {
        let document = Html::parse_document(html);
        let s = &self.selectors;

        document
            .select(&s.container)
            .map(|container| Article {
                title: s.title.extract(&container),
                body: s.body.extract(&container),
                image: resolve_url(&self.source_url, &s.image.extract(&container)),
                audio: resolve_url(&self.source_url, &s.audio.extract(&container)),
                link: resolve_url(&self.source_url, &s.link.extract(&container)),
            })
            .collect()
    }
}
