//! Application state and service initialization
//!
//! This module centralizes all service initialization and dependency injection,
//! making it easier to manage the application lifecycle and test services.

use std::sync::Arc;

use crate::db::{EvaluationStore, InMemoryEvaluationStore, PgEvaluationStore};
use crate::model::Config;
use crate::model::config::EventConfig;
use crate::retriever::WebPageFetcher;
use crate::service::{
    AssessmentPipeline, BraveSearchProvider, EvidenceCollector, EvidenceConfig, LlmClient,
    RunRegistry, ThrottledSearchCache,
};

/// Application state containing all services and shared resources
///
/// Shared with every Actix-web handler through `web::Data`.
pub struct AppState {
    /// Evaluation persistence
    pub store: Arc<dyn EvaluationStore>,
    /// Process-wide search cache and throttle
    pub search: Arc<ThrottledSearchCache>,
    /// Assessment pipeline, one spawned run per request
    pub pipeline: Arc<AssessmentPipeline>,
    /// Evaluations with an active run
    pub runs: RunRegistry,
    /// Keepalive and queue sizing for progress streams
    pub events: EventConfig,
    /// Whether a search API key is configured
    pub search_enabled: bool,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. LLM client initialization (requires LLM_API_KEY)
    /// 2. Store initialization (PostgreSQL, in-memory when unavailable)
    /// 3. Search cache, page fetcher and evidence collector construction
    /// 4. Pipeline construction
    pub async fn new(config: Config) -> Result<Self, AppError> {
        // Create shared LLM client (required)
        let api_key = config
            .llm
            .api_key
            .clone()
            .ok_or(AppError::MissingConfig("LLM_API_KEY"))?;

        let llm_client = LlmClient::from_config(&config.llm, &api_key)
            .map_err(|_| AppError::InvalidConfig("Invalid LLM_API_URL or LLM_API_KEY"))?;

        let store = Self::build_store().await;

        let search_enabled = config.search.api_key.is_some();
        let search = Arc::new(ThrottledSearchCache::new(
            Arc::new(BraveSearchProvider::new(&config.search)),
            config.search.min_interval,
        ));

        let collector = Arc::new(EvidenceCollector::new(
            Arc::clone(&search),
            Arc::new(WebPageFetcher::new(config.fetch.timeout)),
            EvidenceConfig {
                max_page_chars: config.fetch.max_chars,
                retrievers: config.retrievers,
                vendor_domains: config.vendor_domains,
            },
        ));

        let pipeline = Arc::new(AssessmentPipeline::new(
            Arc::clone(&store),
            collector,
            llm_client,
        ));

        Ok(Self {
            store,
            search,
            pipeline,
            runs: RunRegistry::new(),
            events: config.events,
            search_enabled,
        })
    }

    /// PostgreSQL when reachable, otherwise an in-process store
    async fn build_store() -> Arc<dyn EvaluationStore> {
        let pool = match crate::db::create_pool().await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(error = %e, "PostgreSQL unavailable, evaluations will be kept in memory");
                return Arc::new(InMemoryEvaluationStore::new());
            }
        };

        if let Err(e) = crate::db::init_schema(&pool).await {
            tracing::warn!(error = %e, "Schema initialization failed, evaluations will be kept in memory");
            return Arc::new(InMemoryEvaluationStore::new());
        }

        Arc::new(PgEvaluationStore::new(pool))
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

#[cfg(test)]
pub mod testing {
    //! State wired to in-memory fakes for handler tests

    use std::time::Duration;

    use super::*;
    use crate::service::evidence::testing::{StaticPageFetcher, StaticSearchProvider};
    use crate::service::llm::testing::{ScriptedChatModel, client};

    pub fn state(store: Arc<InMemoryEvaluationStore>) -> AppState {
        let search = Arc::new(ThrottledSearchCache::new(
            Arc::new(StaticSearchProvider::default()),
            Duration::ZERO,
        ));
        let collector = Arc::new(EvidenceCollector::new(
            Arc::clone(&search),
            Arc::new(StaticPageFetcher::default()),
            EvidenceConfig::default(),
        ));
        let store: Arc<dyn EvaluationStore> = store;
        let pipeline = Arc::new(AssessmentPipeline::new(
            Arc::clone(&store),
            collector,
            client(ScriptedChatModel::unavailable()),
        ));

        AppState {
            store,
            search,
            pipeline,
            runs: RunRegistry::new(),
            events: Config::default().events,
            search_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_llm_key_is_rejected() {
        let mut config = Config::default();
        config.llm.api_key = None;

        let result = AppState::new(config).await;
        assert!(matches!(result, Err(AppError::MissingConfig("LLM_API_KEY"))));
    }
}
