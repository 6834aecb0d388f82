//! Generic web page fetcher

use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use scraper::Html;
use url::Url;

use super::{FetchError, FetchedPage, PageFetcher, collapse_whitespace, extract_title, html_to_text, truncate_chars};

const USER_AGENT: &str = "vendorlens-agent/1.0";
/// Upper bound on the bytes read from one response body
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Fetches one page per call. No retries and no caching.
pub struct WebPageFetcher {
    client: Client,
}

impl WebPageFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[async_trait]
impl PageFetcher for WebPageFetcher {
    async fn fetch(&self, url: &Url, max_chars: usize) -> Result<FetchedPage, FetchError> {
        tracing::debug!(url = %url, "Fetching web page");

        let response = self.client.get(url.as_str()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|| "text/html".to_string());

        let body = read_capped(std::pin::pin!(response.bytes_stream()), MAX_BODY_BYTES).await?;
        if body.len() == MAX_BODY_BYTES {
            tracing::debug!(url = %url, limit = MAX_BODY_BYTES, "Response body truncated");
        }
        let body = String::from_utf8_lossy(&body);

        let (title, text) = if content_type.contains("text/plain") {
            (None, truncate_chars(&collapse_whitespace(&body), max_chars))
        } else {
            let document = Html::parse_document(&body);
            (extract_title(&document), html_to_text(&document, max_chars))
        };

        Ok(FetchedPage {
            url: url.clone(),
            title,
            text,
        })
    }
}

/// Collect a body stream, stopping once `limit` bytes have been read
async fn read_capped<S, B, E>(mut stream: S, limit: usize) -> Result<Vec<u8>, E>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        let remaining = limit - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(chunk);
    }
    Ok(body)
}
