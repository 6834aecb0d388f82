//! OpenAPI specification endpoints

use actix_web::{HttpResponse, get};
use utoipa::OpenApi;

use crate::api::error::ApiError;
use crate::api::{error, evaluation, health, search};
use crate::db::models::PaginatedEvaluations;
use crate::model::{
    AggregateRecommendation, AlignmentStatus, Confidence, Credibility, Dimension,
    DimensionImportance, DimensionOutput, DimensionStatus, Evaluation, EvaluationKind,
    EvaluationStatus, EventKind, PipelineEvent, RankedVendor, RequirementProfile,
    ScaleAssumptions, Source, TcoEstimate, VendorDecision, VendorEvaluation,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        evaluation::create_evaluation,
        evaluation::list_evaluations,
        evaluation::get_evaluation,
        evaluation::run_evaluation,
        evaluation::set_vendor_decision,
        search::cache_stats,
        search::clear_cache,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            evaluation::CreateEvaluationRequest,
            evaluation::VendorInput,
            evaluation::DecisionRequest,
            error::ErrorResponse,
            health::HealthStatus,
            health::ReadinessStatus,
            health::DependencyHealth,
            PaginatedEvaluations,
            Evaluation,
            EvaluationKind,
            EvaluationStatus,
            VendorEvaluation,
            VendorDecision,
            Dimension,
            DimensionStatus,
            DimensionOutput,
            DimensionImportance,
            Confidence,
            AlignmentStatus,
            Credibility,
            Source,
            TcoEstimate,
            RequirementProfile,
            ScaleAssumptions,
            AggregateRecommendation,
            RankedVendor,
            PipelineEvent,
            EventKind,
            crate::service::CacheStats,
        )
    ),
    tags(
        (name = "evaluations", description = "Evidence-gated vendor evaluations"),
        (name = "search", description = "Search cache"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> Result<HttpResponse, ApiError> {
    let yaml = ApiDoc::openapi()
        .to_yaml()
        .map_err(|e| ApiError::Internal(format!("OpenAPI serialization failed: {}", e)))?;

    Ok(HttpResponse::Ok().content_type("text/yaml").body(yaml))
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/v1/evaluations",
            "/v1/evaluations/{id}",
            "/v1/evaluations/{id}/run",
            "/v1/evaluations/{id}/vendors/{vendor_id}/decision",
            "/v1/search/cache",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc.to_yaml().is_ok());
    }
}
