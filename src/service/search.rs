//! Keyword search with a shared result cache and a global request throttle
//!
//! One `ThrottledSearchCache` is shared by every collector in the process.
//! The cache map and the last-request timestamp live behind a single mutex;
//! a separate single-flight lock serializes cache misses so identical
//! concurrent queries reach the provider once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use utoipa::ToSchema;

use crate::model::SearchHit;
use crate::model::config::SearchConfig;

const BRAVE_SEARCH_PATH: &str = "/res/v1/web/search";
const BRAVE_MAX_COUNT: usize = 20;
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SearchError {
    #[error("Search provider rejected credentials (HTTP {0})")]
    Auth(u16),

    #[error("Search provider rate limited the request")]
    RateLimited,

    #[error("Search provider returned HTTP {0}")]
    Http(u16),

    #[error("Search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse search response: {0}")]
    Parse(String),

    #[error("Search provider is not configured")]
    NotConfigured,
}

/// Upstream keyword search
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

/// Brave Web Search API client
pub struct BraveSearchProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BraveSearchProvider {
    pub fn new(config: &SearchConfig) -> Self {
        if config.api_key.is_none() {
            tracing::warn!("BRAVE_KEY not set, web search will return no results");
        }

        Self {
            client: Client::builder()
                .timeout(SEARCH_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn parse_response(body: &str) -> Result<Vec<SearchHit>, SearchError> {
        let parsed: BraveResponse =
            serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;

        Ok(parsed
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.description,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for BraveSearchProvider {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::NotConfigured)?;
        let count = count.clamp(1, BRAVE_MAX_COUNT).to_string();

        let response = self
            .client
            .get(format!("{}{}", self.base_url, BRAVE_SEARCH_PATH))
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => return Err(SearchError::Auth(status.as_u16())),
            429 => return Err(SearchError::RateLimited),
            _ if !status.is_success() => return Err(SearchError::Http(status.as_u16())),
            _ => {}
        }

        let body = response.text().await?;
        Self::parse_response(&body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SearchKey {
    query: String,
    max_results: usize,
    scope: Option<String>,
}

#[derive(Default)]
struct SearchState {
    cache: HashMap<SearchKey, Vec<SearchHit>>,
    last_request: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CacheStats {
    pub cached_queries: usize,
    pub total_cached_results: usize,
}

/// Process-wide search front end: cache, throttle and single-flight
pub struct ThrottledSearchCache {
    provider: Arc<dyn SearchProvider>,
    min_interval: Duration,
    state: Mutex<SearchState>,
    in_flight: Mutex<()>,
}

impl ThrottledSearchCache {
    pub fn new(provider: Arc<dyn SearchProvider>, min_interval: Duration) -> Self {
        tracing::info!(
            min_interval_ms = min_interval.as_millis() as u64,
            "Search cache initialized"
        );

        Self {
            provider,
            min_interval,
            state: Mutex::new(SearchState::default()),
            in_flight: Mutex::new(()),
        }
    }

    /// Search, optionally restricted to one domain. Never fails: provider
    /// errors are logged and yield (and cache) an empty list.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        scope: Option<&str>,
    ) -> Vec<SearchHit> {
        let key = SearchKey {
            query: query.to_string(),
            max_results,
            scope: scope.map(normalize_scope).filter(|s| !s.is_empty()),
        };

        if let Some(hits) = self.cached(&key).await {
            tracing::debug!(query = %query, scope = ?key.scope, "Search cache hit");
            return hits;
        }

        let _flight = self.in_flight.lock().await;

        // Another caller may have filled the entry while we waited
        if let Some(hits) = self.cached(&key).await {
            tracing::debug!(query = %query, scope = ?key.scope, "Search cache hit after wait");
            return hits;
        }

        self.throttle().await;

        let upstream_query = match &key.scope {
            Some(domain) => format!("site:{} {}", domain, query),
            None => query.to_string(),
        };

        let start_time = std::time::Instant::now();
        let hits = match self.provider.search(&upstream_query, max_results).await {
            Ok(mut hits) => {
                hits.truncate(max_results);
                tracing::debug!(
                    query = %upstream_query,
                    results = hits.len(),
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Search completed"
                );
                hits
            }
            Err(e) => {
                tracing::warn!(query = %upstream_query, error = %e, "Search failed, returning no results");
                Vec::new()
            }
        };

        self.state.lock().await.cache.insert(key, hits.clone());
        hits
    }

    async fn cached(&self, key: &SearchKey) -> Option<Vec<SearchHit>> {
        self.state.lock().await.cache.get(key).cloned()
    }

    /// Wait until `min_interval` has passed since the previous upstream
    /// request, then record this one
    async fn throttle(&self) {
        let wait = {
            let state = self.state.lock().await;
            state
                .last_request
                .map(|last| self.min_interval.saturating_sub(last.elapsed()))
                .unwrap_or(Duration::ZERO)
        };

        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Search throttle waiting");
            tokio::time::sleep(wait).await;
        }

        self.state.lock().await.last_request = Some(Instant::now());
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        CacheStats {
            cached_queries: state.cache.len(),
            total_cached_results: state.cache.values().map(Vec::len).sum(),
        }
    }

    /// Drop every cached result. The throttle timestamp is kept.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        let dropped = state.cache.len();
        state.cache.clear();
        tracing::info!(dropped, "Search cache cleared");
    }
}

/// Bare lowercase host for a `site:` restriction
fn normalize_scope(scope: &str) -> String {
    let scope = scope.trim().to_lowercase();
    let scope = scope
        .strip_prefix("https://")
        .or_else(|| scope.strip_prefix("http://"))
        .unwrap_or(&scope);
    let scope = scope.split('/').next().unwrap_or_default();
    scope.strip_prefix("www.").unwrap_or(scope).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        queries: std::sync::Mutex<Vec<String>>,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                queries: std::sync::Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl SearchProvider for CountingProvider {
        async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.fail {
                return Err(SearchError::RateLimited);
            }
            Ok((0..count.min(3))
                .map(|i| SearchHit {
                    title: format!("Result {}", i),
                    url: format!("https://example.com/{}", i),
                    snippet: query.to_string(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let provider = CountingProvider::new(false);
        let cache = ThrottledSearchCache::new(provider.clone(), Duration::ZERO);

        let first = cache.search("acme soc2", 5, None).await;
        let second = cache.search("acme soc2", 5, None).await;

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_key_includes_max_results_and_scope() {
        let provider = CountingProvider::new(false);
        let cache = ThrottledSearchCache::new(provider.clone(), Duration::ZERO);

        cache.search("pricing", 5, None).await;
        cache.search("pricing", 2, None).await;
        cache.search("pricing", 5, Some("acme.com")).await;
        cache.search("pricing", 5, Some("https://www.acme.com/")).await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        let queries = provider.queries.lock().unwrap().clone();
        assert!(queries.contains(&"site:acme.com pricing".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_identical_queries_call_once() {
        let provider = CountingProvider::new(false);
        let cache = Arc::new(ThrottledSearchCache::new(provider.clone(), Duration::ZERO));

        let a = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.search("acme sso", 5, None).await })
        };
        let b = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.search("acme sso", 5, None).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a, b);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_degrade_to_cached_empty() {
        let provider = CountingProvider::new(true);
        let cache = ThrottledSearchCache::new(provider.clone(), Duration::ZERO);

        assert!(cache.search("acme", 5, None).await.is_empty());
        assert!(cache.search("acme", 5, None).await.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_spaces_upstream_requests() {
        let provider = CountingProvider::new(false);
        let interval = Duration::from_millis(1100);
        let cache = ThrottledSearchCache::new(provider.clone(), interval);

        let start = Instant::now();
        cache.search("q1", 5, None).await;
        cache.search("q2", 5, None).await;
        cache.search("q3", 5, None).await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= interval * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_does_not_wait_for_throttle() {
        let provider = CountingProvider::new(false);
        let cache = ThrottledSearchCache::new(provider.clone(), Duration::from_secs(10));

        cache.search("q1", 5, None).await;
        let start = Instant::now();
        cache.search("q1", 5, None).await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let provider = CountingProvider::new(false);
        let cache = ThrottledSearchCache::new(provider.clone(), Duration::ZERO);

        cache.search("a", 5, None).await;
        cache.search("b", 1, None).await;

        let stats = cache.stats().await;
        assert_eq!(stats.cached_queries, 2);
        assert_eq!(stats.total_cached_results, 4);

        cache.clear().await;
        assert_eq!(cache.stats().await.cached_queries, 0);

        cache.search("a", 5, None).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_parse_brave_response() {
        let body = r#"{"web": {"results": [
            {"title": "Acme Trust", "url": "https://acme.com/trust", "description": "SOC 2"},
            {"title": "No url", "url": ""}
        ]}}"#;

        let hits = BraveSearchProvider::parse_response(body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].snippet, "SOC 2");

        assert!(BraveSearchProvider::parse_response("{}").unwrap().is_empty());
        assert!(BraveSearchProvider::parse_response("not json").is_err());
    }

    #[test]
    fn test_normalize_scope() {
        assert_eq!(normalize_scope("https://www.Acme.com/path"), "acme.com");
        assert_eq!(normalize_scope("docs.acme.com"), "docs.acme.com");
    }
}
