use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::{Error, Result};

pub const DEFAULT_SOURCE_URL: &str = "https://www.yiddish24.com/cat/57";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// CSS selectors for the bulletin page. These follow the upstream markup and
/// have to be revisited whenever that markup changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub container: String,
    pub title: String,
    pub body: String,
    pub image: String,
    pub audio: String,
    pub link: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            container: ".bulletin-news-col.text-right.yiddish-player-details.darkred".to_string(),
            title: "h1".to_string(),
            body: "p".to_string(),
            image: "img".to_string(),
            audio: ".button-sections .aeroBtn".to_string(),
            link: "h1 a".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub source_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub selectors: Selectors,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            selectors: Selectors::default(),
        }
    }
}

impl ScraperConfig {
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn parsed_source_url(&self) -> Result<Url> {
        Url::parse(&self.source_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.source_url, e)))
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Base URL the display page uses to reach the scrape endpoint. Derived
    /// from `bind` when unset.
    pub public_url: Option<String>,
}

impl ServerConfig {
    pub fn new(bind: &str) -> Result<Self> {
        let bind = bind
            .parse()
            .map_err(|e| Error::Config(format!("invalid bind address {}: {}", bind, e)))?;
        Ok(Self { bind, public_url: None })
    }

    pub fn with_public_url(mut self, url: Option<String>) -> Self {
        self.public_url = url;
        self
    }

    pub fn endpoint_base(&self) -> Result<Url> {
        let raw = match &self.public_url {
            Some(url) => url.clone(),
            None => {
                let host = if self.bind.ip().is_unspecified() {
                    "127.0.0.1".to_string()
                } else {
                    match self.bind {
                        SocketAddr::V4(addr) => addr.ip().to_string(),
                        SocketAddr::V6(addr) => format!("[{}]", addr.ip()),
                    }
                };
                format!("http://{}:{}", host, self.bind.port())
            }
        };
        Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
    }
}
