//! Display state of the bulletin page and its HTML rendering.
//!
//! The page keeps three things: whether a fetch is in flight, the last
//! successful result and the last error. [`DisplayState::render`] turns that
//! into the fragment swapped into `#content` by the page script.

use bt_core::Article;
use url::Url;

/// Last successful answer of the scrape endpoint, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub timestamp: String,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    loading: bool,
    data: Option<Snapshot>,
    error: Option<String>,
}

impl DisplayState {
    /// State shown before the first fetch returns.
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    /// Marks a fetch as started. Returns false, leaving the state alone,
    /// when one is already in flight: overlapping triggers are ignored.
    pub fn begin_fetch(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Folds the outcome of a fetch in. Success replaces the data and clears
    /// the error; failure replaces the error and drops the data.
    pub fn apply(&mut self, outcome: Result<Snapshot, String>) {
        self.loading = false;
        match outcome {
            Ok(snapshot) => {
                self.data = Some(snapshot);
                self.error = None;
            }
            Err(message) => {
                self.data = None;
                self.error = Some(message);
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn data(&self) -> Option<&Snapshot> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `source_home` is linked from the audio attribution line.
    pub fn render(&self, source_home: &str) -> String {
        if self.loading {
            return render_loading();
        }
        if let Some(error) = &self.error {
            return render_error(error);
        }
        match &self.data {
            Some(snapshot) => render_snapshot(snapshot, source_home),
            None => String::new(),
        }
    }
}

pub fn render_loading() -> String {
    r#"<div class="loading"><div class="spinner" role="status" aria-label="Loading"></div></div>"#
        .to_string()
}

pub fn render_error(message: &str) -> String {
    format!(
        r#"<div class="error-panel" role="alert"><p class="error-title">Error</p><p class="error-message">{}</p></div>"#,
        escape_html(message)
    )
}

fn render_snapshot(snapshot: &Snapshot, source_home: &str) -> String {
    let mut html = format!(
        r#"<p class="fetched">Last fetched: <time>{}</time></p>"#,
        escape_html(&snapshot.timestamp)
    );

    if snapshot.articles.is_empty() {
        html.push_str(r#"<p class="empty">No articles found.</p>"#);
        return html;
    }

    html.push_str(r#"<section class="articles">"#);
    for article in &snapshot.articles {
        render_article(&mut html, article, source_home);
    }
    html.push_str("</section>");
    html
}

fn render_article(html: &mut String, article: &Article, source_home: &str) {
    let title = escape_html(&article.title);

    html.push_str(r#"<article class="article">"#);
    html.push_str(&format!("<h2>{}</h2>", title));

    if article.has_image() {
        html.push_str(&format!(
            r#"<div class="article-image"><img src="{}" alt="Image for {}" loading="lazy"></div>"#,
            escape_html(&article.image),
            title
        ));
    }

    html.push_str(&format!(
        r#"<p class="article-body">{}</p>"#,
        escape_html(&article.body)
    ));

    if article.has_link() {
        html.push_str(&format!(
            r#"<a class="read-more" href="{}">Read more</a>"#,
            escape_html(&article.link)
        ));
    }

    if article.has_audio() {
        html.push_str(&format!(
            concat!(
                r#"<div class="article-audio"><audio controls><source src="{}" type="audio/mpeg">"#,
                "Your browser does not support the audio element.</audio>",
                r#"<p class="audio-credit">Audio source: <a href="{}">{}</a></p></div>"#,
            ),
            escape_html(&article.audio),
            escape_html(source_home),
            escape_html(&display_host(source_home)),
        ));
    }

    html.push_str("</article>");
}

/// Host without a leading `www.`, for link text.
fn display_host(home: &str) -> String {
    Url::parse(home)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| home.to_string())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
