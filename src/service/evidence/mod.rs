//! Evidence collection: search, fetch, classify and excerpt vendor sources

pub mod domains;
pub mod excerpt;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use url::Url;

use crate::model::evidence::official_count;
use crate::model::{RetrieverConfig, SearchHit, Source};
use crate::retriever::PageFetcher;
use crate::service::search::ThrottledSearchCache;

use domains::{
    classify_credibility, is_community_host, normalize_url, normalize_vendor_name,
    resolve_official_domains,
};
use excerpt::extract_excerpt;

/// Domain-scoped searches per collection
const MAX_OFFICIAL_DOMAINS: usize = 2;
const SCOPED_SEARCH_RESULTS: usize = 5;
/// Results fetched from each scoped search
const SCOPED_FETCHES_PER_DOMAIN: usize = 2;
/// Below this many official sources a broader search is made
const MIN_OFFICIAL_SOURCES: usize = 2;
const BROAD_SEARCH_RESULTS: usize = 8;
const BROAD_FETCH_ATTEMPTS: usize = 3;
/// Pages with less text than this are ignored
const MIN_PAGE_CHARS: usize = 100;

/// Settings for the evidence collector
#[derive(Debug, Clone)]
pub struct EvidenceConfig {
    pub max_page_chars: usize,
    pub retrievers: RetrieverConfig,
    pub vendor_domains: BTreeMap<String, Vec<String>>,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            max_page_chars: 8000,
            retrievers: RetrieverConfig::default(),
            vendor_domains: BTreeMap::new(),
        }
    }
}

/// The vendor being researched
#[derive(Debug, Clone, Copy)]
pub struct VendorRef<'a> {
    pub name: &'a str,
    pub website: Option<&'a str>,
}

/// Collects classified sources for one topic about one vendor
pub struct EvidenceCollector {
    search: Arc<ThrottledSearchCache>,
    fetcher: Arc<dyn PageFetcher>,
    config: EvidenceConfig,
}

/// Per-collection bookkeeping
struct Collection {
    seen: HashSet<String>,
    sources: Vec<Source>,
    official_domains: Vec<String>,
    normalized_name: String,
}

impl EvidenceCollector {
    pub fn new(
        search: Arc<ThrottledSearchCache>,
        fetcher: Arc<dyn PageFetcher>,
        config: EvidenceConfig,
    ) -> Self {
        Self {
            search,
            fetcher,
            config,
        }
    }

    /// Official domains used when collecting for this vendor
    pub fn official_domains(&self, vendor: VendorRef<'_>) -> Vec<String> {
        let mut domains =
            resolve_official_domains(vendor.name, vendor.website, &self.config.vendor_domains);
        domains.truncate(MAX_OFFICIAL_DOMAINS);
        domains
    }

    /// Gather sources for `topic_query`. Never fails; unreachable or thin
    /// pages are skipped.
    pub async fn collect(&self, topic_query: &str, vendor: VendorRef<'_>) -> Vec<Source> {
        let mut collection = Collection {
            seen: HashSet::new(),
            sources: Vec::new(),
            official_domains: self.official_domains(vendor),
            normalized_name: normalize_vendor_name(vendor.name),
        };

        // Step 1: search each official domain directly
        for domain in collection.official_domains.clone() {
            let hits = self
                .search
                .search(topic_query, SCOPED_SEARCH_RESULTS, Some(&domain))
                .await;

            for hit in hits.iter().take(SCOPED_FETCHES_PER_DOMAIN) {
                self.try_add(&mut collection, hit, topic_query).await;
            }
        }

        // Step 2: broaden when official evidence is thin
        if official_count(&collection.sources) < MIN_OFFICIAL_SOURCES {
            let broad_query = format!("{} {}", vendor.name, topic_query);
            let hits = self
                .search
                .search(&broad_query, BROAD_SEARCH_RESULTS, None)
                .await;

            let mut attempts = 0;
            for hit in &hits {
                if attempts >= BROAD_FETCH_ATTEMPTS {
                    break;
                }
                let Some(url) = Url::parse(&hit.url).ok() else {
                    continue;
                };
                if collection.seen.contains(&normalize_url(&url))
                    || is_community_host(&url, &self.config.retrievers.deny)
                {
                    tracing::debug!(url = %url, "Skipping already seen or community source");
                    continue;
                }
                attempts += 1;
                self.try_add(&mut collection, hit, &broad_query).await;
            }
        }

        tracing::debug!(
            vendor = %vendor.name,
            query = %topic_query,
            sources = collection.sources.len(),
            official = official_count(&collection.sources),
            "Evidence collected"
        );

        collection.sources
    }

    /// Fetch, classify and excerpt one search hit
    async fn try_add(&self, collection: &mut Collection, hit: &SearchHit, query: &str) {
        let Some(url) = Url::parse(&hit.url).ok() else {
            tracing::debug!(url = %hit.url, "Skipping unparseable search result URL");
            return;
        };

        if !collection.seen.insert(normalize_url(&url)) {
            return;
        }

        let page = match self.fetcher.fetch(&url, self.config.max_page_chars).await {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Fetch failed, skipping source");
                return;
            }
        };

        if page.text.chars().count() < MIN_PAGE_CHARS {
            tracing::debug!(url = %url, chars = page.text.len(), "Page too short, skipping source");
            return;
        }

        let credibility = classify_credibility(
            &url,
            &collection.official_domains,
            &collection.normalized_name,
        );

        let title = page
            .title
            .filter(|t| !t.is_empty())
            .or_else(|| Some(hit.title.clone()).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| url.to_string());

        collection.sources.push(Source {
            url: url.to_string(),
            title,
            excerpt: extract_excerpt(&page.text, query),
            credibility,
            accessed_at: Utc::now(),
            query: query.to_string(),
        });
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::testing::*;
    use super::*;
    use crate::model::Credibility;

    fn collector(search: StaticSearchProvider, fetcher: StaticPageFetcher) -> EvidenceCollector {
        let cache = Arc::new(ThrottledSearchCache::new(Arc::new(search), Duration::ZERO));
        EvidenceCollector::new(cache, Arc::new(fetcher), EvidenceConfig::default())
    }

    const ACME: VendorRef<'static> = VendorRef {
        name: "Acme Cloud",
        website: Some("https://www.acme.com"),
    };

    #[tokio::test]
    async fn test_official_sources_skip_broad_search() {
        let search = StaticSearchProvider::default()
            .rule(
                &["site:acme.com", "security"],
                &["https://acme.com/trust", "https://acme.com/security", "https://acme.com/third"],
            )
            .rule(&["acme cloud security"], &["https://www.g2.com/acme"]);
        let fetcher = StaticPageFetcher::default()
            .page("https://acme.com/trust", &long_text("SOC 2 security report"))
            .page("https://acme.com/security", &long_text("Security overview"))
            .page("https://acme.com/third", &long_text("Security whitepaper"))
            .page("https://www.g2.com/acme", &long_text("Security reviews"));

        let sources = collector(search, fetcher).collect("security", ACME).await;

        // Only the top 2 scoped results, and no broad search
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|s| s.credibility == Credibility::Official));
        assert!(sources[0].excerpt.contains("SOC 2 security report"));
    }

    #[tokio::test]
    async fn test_broad_search_when_official_thin() {
        let search = StaticSearchProvider::default()
            .rule(&["site:acme.com", "pricing"], &["https://acme.com/pricing"])
            .rule(
                &["acme cloud pricing"],
                &[
                    "https://acme.com/pricing",
                    "https://www.reddit.com/r/saas/acme",
                    "https://www.g2.com/products/acme/pricing",
                    "https://blog.example.org/acme-review",
                    "https://missing.example.org/a",
                    "https://never.example.org/b",
                ],
            );
        let fetcher = StaticPageFetcher::default()
            .page("https://acme.com/pricing", &long_text("Pricing per user"))
            .page("https://www.g2.com/products/acme/pricing", &long_text("Pricing reviews"))
            .page("https://blog.example.org/acme-review", &long_text("Pricing opinions"))
            .page("https://never.example.org/b", &long_text("Pricing never fetched"));

        let sources = collector(search, fetcher).collect("pricing", ACME).await;

        let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://acme.com/pricing",
                "https://www.g2.com/products/acme/pricing",
                "https://blog.example.org/acme-review",
            ]
        );
        assert_eq!(sources[0].credibility, Credibility::Official);
        assert_eq!(sources[1].credibility, Credibility::ThirdPartyTrusted);
        assert_eq!(sources[2].credibility, Credibility::Community);
        assert_eq!(sources[0].query, "pricing");
        assert_eq!(sources[1].query, "Acme Cloud pricing");
    }

    #[tokio::test]
    async fn test_short_and_failed_pages_are_skipped() {
        let search = StaticSearchProvider::default().rule(
            &["site:acme.com"],
            &["https://acme.com/tiny", "https://acme.com/down"],
        );
        let fetcher = StaticPageFetcher::default().page("https://acme.com/tiny", "Too short");

        let sources = collector(search, fetcher).collect("sso", ACME).await;
        assert!(sources.is_empty());
    }
}
