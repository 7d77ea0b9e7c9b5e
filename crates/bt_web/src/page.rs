use crate::view::{render_error, render_loading, DisplayState};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; }
.page { max-width: 56rem; margin: 0 auto; padding: 1rem; }
.refresh { margin-bottom: 1rem; padding: .5rem 1rem; background: #3b82f6; color: #fff; border: 0; border-radius: .25rem; cursor: pointer; }
.refresh:hover { background: #2563eb; }
.refresh:disabled { opacity: .6; cursor: wait; }
.loading { display: flex; justify-content: center; padding: 4rem 0; }
.spinner { width: 3rem; height: 3rem; border-radius: 50%; border-top: 2px solid #111827; border-bottom: 2px solid #111827; animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
.error-panel { background: #fee2e2; border: 1px solid #f87171; color: #b91c1c; padding: .75rem 1rem; border-radius: .25rem; }
.error-title { font-weight: bold; margin: 0 0 .25rem; }
.article { margin-bottom: 2rem; padding: 1rem; border: 1px solid #e5e7eb; border-radius: .5rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
.article img { max-width: 100%; height: auto; border-radius: .375rem; }
.article-body { color: #374151; }
.read-more, .audio-credit a { color: #3b82f6; }
.audio-credit { font-size: .875rem; color: #6b7280; }
"#;

// Loads `view` on start and on each click, ignoring clicks while a request
// is in flight. This is the only in-flight guard: the server renders every
// `view` request from a fresh state.
const SCRIPT: &str = r#"
(() => {
  const content = document.getElementById('content');
  const button = document.getElementById('refresh');
  const loading = document.getElementById('loading-template');
  const failure = document.getElementById('error-template');
  let inFlight = false;

  const showError = (message) => {
    const panel = failure.content.cloneNode(true);
    panel.querySelector('.error-message').textContent = message;
    content.replaceChildren(panel);
  };

  const load = async () => {
    if (inFlight) return;
    inFlight = true;
    button.disabled = true;
    content.replaceChildren(loading.content.cloneNode(true));
    try {
      const response = await fetch('view', { cache: 'no-store' });
      if (!response.ok) throw new Error('Failed to fetch data');
      content.innerHTML = await response.text();
    } catch (err) {
      showError(err instanceof Error ? err.message : 'Failed to fetch data');
    } finally {
      inFlight = false;
      button.disabled = false;
    }
  };

  button.addEventListener('click', load);
  load();
})();
"#;

/// The whole display page, starting in the loading state.
pub fn render_page() -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Scraped Articles</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"page\">\n");
    html.push_str("<h1>Scraped Articles</h1>\n");
    html.push_str("<button id=\"refresh\" class=\"refresh\" type=\"button\">Refresh Data</button>\n");
    html.push_str("<main id=\"content\" aria-live=\"polite\">");
    html.push_str(&DisplayState::loading().render(""));
    html.push_str("</main>\n</div>\n");
    html.push_str("<template id=\"loading-template\">");
    html.push_str(&render_loading());
    html.push_str("</template>\n<template id=\"error-template\">");
    html.push_str(&render_error(""));
    html.push_str("</template>\n<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}
