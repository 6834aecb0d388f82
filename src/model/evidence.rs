use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How much a source can be trusted when scoring a vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Credibility {
    /// Vendor-owned domain (trust center, docs, pricing page)
    Official,
    /// Analyst firms, review sites and established tech media
    ThirdPartyTrusted,
    /// Everything else (forums, blogs, social)
    Community,
}

impl Credibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Credibility::Official => "official",
            Credibility::ThirdPartyTrusted => "third_party_trusted",
            Credibility::Community => "community",
        }
    }
}

/// A fetched and classified piece of evidence backing a dimension verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Source {
    pub url: String,
    pub title: String,
    /// Query-relevant excerpt, at most 500 characters
    pub excerpt: String,
    pub credibility: Credibility,
    pub accessed_at: DateTime<Utc>,
    /// Search query that surfaced this source
    pub query: String,
}

impl Source {
    pub fn is_official(&self) -> bool {
        self.credibility == Credibility::Official
    }
}

/// Count the official sources in a slice
pub fn official_count(sources: &[Source]) -> usize {
    sources.iter().filter(|s| s.is_official()).count()
}

/// A single result returned by the keyword search provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
