//! Page fetching for evidence collection

mod web;

use async_trait::async_trait;
use scraper::{Html, Node, Selector};
use url::Url;

pub use web::WebPageFetcher;

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: &[&str] = &[
    "head", "script", "style", "nav", "footer", "header", "noscript", "svg", "template",
];

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Plain text of a fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub url: Url,
    pub title: Option<String>,
    pub text: String,
}

/// Fetches a URL and returns its readable text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, max_chars: usize) -> Result<FetchedPage, FetchError>;
}

/// Extract readable text from an HTML document, skipping chrome such as
/// navigation, scripts and footers, with whitespace collapsed
pub fn html_to_text(document: &Html, max_chars: usize) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if skipped {
            continue;
        }

        let text: &str = text;
        if !text.trim().is_empty() {
            parts.push(text);
        }
    }

    let collapsed = collapse_whitespace(&parts.join(" "));
    truncate_chars(&collapsed, max_chars)
}

/// Extract title from <title> or <meta property="og:title">
pub fn extract_title(document: &Html) -> Option<String> {
    if let Ok(selector) = Selector::parse("title")
        && let Some(el) = document.select(&selector).next()
    {
        let title = collapse_whitespace(&el.text().collect::<String>());
        if !title.is_empty() {
            return Some(title);
        }
    }

    let selector = Selector::parse("meta[property=\"og:title\"]").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters without splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_strips_chrome() {
        let html = Html::parse_document(
            r#"<html><head><title>Trust Center</title><style>body { color: red; }</style></head>
            <body>
              <header>Sign in</header>
              <nav><a href="/">Home</a></nav>
              <main><h1>Security</h1><p>We are   SOC 2
              Type II certified.</p></main>
              <script>var tracking = true;</script>
              <footer>Copyright</footer>
            </body></html>"#,
        );

        let text = html_to_text(&html, 1000);
        assert_eq!(text, "Security We are SOC 2 Type II certified.");
    }

    #[test]
    fn test_html_to_text_truncates() {
        let html = Html::parse_document("<p>abcdefghij</p>");
        assert_eq!(html_to_text(&html, 4), "abcd");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_extract_title_falls_back_to_og() {
        let html = Html::parse_document(
            r#"<html><head><meta property="og:title" content="Acme Pricing"></head><body></body></html>"#,
        );
        assert_eq!(extract_title(&html), Some("Acme Pricing".to_string()));
    }
}
