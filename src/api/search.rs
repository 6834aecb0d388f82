//! Search cache inspection endpoints

use actix_web::{HttpResponse, delete, get, web};

use crate::app::AppState;
use crate::service::CacheStats;

/// Current search cache size
#[utoipa::path(
    get,
    path = "/v1/search/cache",
    responses(
        (status = 200, description = "Cache statistics", body = CacheStats)
    ),
    tag = "search"
)]
#[get("/v1/search/cache")]
pub async fn cache_stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.search.stats().await)
}

/// Drop every cached search result
#[utoipa::path(
    delete,
    path = "/v1/search/cache",
    responses(
        (status = 204, description = "Cache cleared")
    ),
    tag = "search"
)]
#[delete("/v1/search/cache")]
pub async fn clear_cache(state: web::Data<AppState>) -> HttpResponse {
    state.search.clear().await;
    HttpResponse::NoContent().finish()
}

/// Configure search cache routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(cache_stats).service(clear_cache);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};

    use super::*;
    use crate::app::testing::state;
    use crate::db::InMemoryEvaluationStore;

    #[actix_web::test]
    async fn test_stats_and_clear() {
        let state = web::Data::new(state(Arc::new(InMemoryEvaluationStore::new())));
        state.search.search("acme pricing", 5, None).await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/v1/search/cache").to_request();
        let stats: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["cached_queries"], 1);
        assert_eq!(stats["total_cached_results"], 0);

        let req = test::TestRequest::delete().uri("/v1/search/cache").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.search.stats().await.cached_queries, 0);
    }
}
