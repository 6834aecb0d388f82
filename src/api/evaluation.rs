//! REST API endpoints for vendor evaluations

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use utoipa::{IntoParams, ToSchema};

use crate::api::error::{ApiError, ErrorResponse};
use crate::app::AppState;
use crate::db::models::{ListEvaluationsQuery, PaginatedEvaluations};
use crate::model::{
    DimensionImportance, Evaluation, EvaluationKind, EvaluationStatus, VendorDecision,
    VendorEvaluation,
};
use crate::service::{event_channel, sse_stream};

/// Vendor to compare
#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorInput {
    pub name: String,
    /// Official website, used to find first-party sources
    pub website: Option<String>,
}

/// Request body for creating an assessment
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEvaluationRequest {
    pub name: String,
    /// Free-text description of what the buyer needs
    #[serde(default)]
    pub use_case: String,
    pub vendors: Vec<VendorInput>,
    /// Replaces the importance inferred from the use case
    pub weights: Option<DimensionImportance>,
}

/// Query parameters for listing evaluations
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListEvaluationsParams {
    /// Page number (1-indexed, default: 1)
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100)
    pub page_size: Option<u32>,
    /// Filter by kind (assessment, application)
    pub kind: Option<EvaluationKind>,
    /// Filter by status (pending, running, completed, failed, cancelled)
    pub status: Option<EvaluationStatus>,
}

/// Request body for recording a procurement decision
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub decision: VendorDecision,
}

impl CreateEvaluationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::BadRequest("Evaluation name is required".into()));
        }
        if self.vendors.is_empty() {
            return Err(ApiError::BadRequest("At least one vendor is required".into()));
        }
        if self.vendors.iter().any(|v| v.name.trim().is_empty()) {
            return Err(ApiError::BadRequest("Vendor names must not be blank".into()));
        }
        Ok(())
    }

    fn into_evaluation(self) -> Evaluation {
        let vendors = self
            .vendors
            .into_iter()
            .map(|v| {
                let website = v
                    .website
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty());
                VendorEvaluation::new(v.name.trim(), website)
            })
            .collect();

        Evaluation::new(
            EvaluationKind::Assessment,
            self.name.trim(),
            self.use_case.trim(),
            vendors,
            self.weights,
        )
    }
}

/// Create a vendor assessment
#[utoipa::path(
    post,
    path = "/v1/evaluations",
    request_body = CreateEvaluationRequest,
    responses(
        (status = 201, description = "Evaluation created", body = Evaluation),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[post("/v1/evaluations")]
pub async fn create_evaluation(
    state: web::Data<AppState>,
    body: web::Json<CreateEvaluationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let evaluation = request.into_evaluation();
    state.store.create(&evaluation).await?;

    tracing::info!(
        id = %evaluation.id,
        vendors = evaluation.vendors.len(),
        "Evaluation created"
    );

    Ok(HttpResponse::Created().json(evaluation))
}

/// List evaluations with pagination and filters
#[utoipa::path(
    get,
    path = "/v1/evaluations",
    params(ListEvaluationsParams),
    responses(
        (status = 200, description = "Evaluations retrieved successfully", body = PaginatedEvaluations),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[get("/v1/evaluations")]
pub async fn list_evaluations(
    state: web::Data<AppState>,
    query: web::Query<ListEvaluationsParams>,
) -> Result<HttpResponse, ApiError> {
    let db_query = ListEvaluationsQuery {
        page: query.page,
        page_size: query.page_size,
        kind: query.kind,
        status: query.status,
    };

    let paginated = state.store.list(&db_query).await?;
    Ok(HttpResponse::Ok().json(paginated))
}

/// Get an evaluation by ID
#[utoipa::path(
    get,
    path = "/v1/evaluations/{id}",
    params(
        ("id" = String, Path, description = "Evaluation ID")
    ),
    responses(
        (status = 200, description = "Evaluation retrieved successfully", body = Evaluation),
        (status = 404, description = "Evaluation not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[get("/v1/evaluations/{id}")]
pub async fn get_evaluation(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let evaluation = state.store.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(evaluation))
}

/// Run the assessment pipeline and stream its progress
///
/// The response is a `text/event-stream`. Each frame carries one pipeline
/// event; the stream ends after `workflow_complete` or `workflow_error`.
/// Closing the connection cancels the run.
#[utoipa::path(
    post,
    path = "/v1/evaluations/{id}/run",
    params(
        ("id" = String, Path, description = "Evaluation ID")
    ),
    responses(
        (status = 200, description = "Progress events", content_type = "text/event-stream", body = crate::model::PipelineEvent),
        (status = 404, description = "Evaluation not found", body = ErrorResponse),
        (status = 409, description = "Evaluation is already running", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[post("/v1/evaluations/{id}/run")]
pub async fn run_evaluation(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    // 404 before any stream is opened
    state.store.get(&id).await?;

    let slot = state
        .runs
        .start(&id)
        .ok_or_else(|| ApiError::Conflict(format!("Evaluation {} is already running", id)))?;

    let (events, receiver) = event_channel(state.events.queue_capacity);
    let cancel = CancellationToken::new();

    let pipeline = Arc::clone(&state.pipeline);
    let run_cancel = cancel.clone();
    let run_id = id.clone();
    actix_web::rt::spawn(async move {
        let _slot = slot;
        if let Err(e) = pipeline.run(&run_id, events, run_cancel).await {
            tracing::debug!(id = %run_id, error = %e, "Run ended without a result");
        }
    });

    tracing::info!(id = %id, "Evaluation run started");

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(sse_stream(receiver, state.events.keepalive, cancel)))
}

/// Record the procurement decision for one vendor
#[utoipa::path(
    put,
    path = "/v1/evaluations/{id}/vendors/{vendor_id}/decision",
    params(
        ("id" = String, Path, description = "Evaluation ID"),
        ("vendor_id" = String, Path, description = "Vendor ID within the evaluation")
    ),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = VendorEvaluation),
        (status = 404, description = "Evaluation or vendor not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[put("/v1/evaluations/{id}/vendors/{vendor_id}/decision")]
pub async fn set_vendor_decision(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<DecisionRequest>,
) -> Result<HttpResponse, ApiError> {
    let (id, vendor_id) = path.into_inner();
    let mut evaluation = state.store.get(&id).await?;

    let vendor = evaluation
        .vendor_mut(&vendor_id)
        .ok_or_else(|| ApiError::NotFound(format!("vendor {} in evaluation {}", vendor_id, id)))?;
    vendor.decision = body.decision;
    let updated = vendor.clone();

    evaluation.updated_at = chrono::Utc::now();
    state.store.save(&evaluation).await?;

    tracing::info!(id = %id, vendor_id = %vendor_id, decision = ?body.decision, "Vendor decision recorded");

    Ok(HttpResponse::Ok().json(updated))
}

/// Configure evaluation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_evaluation)
        .service(list_evaluations)
        .service(get_evaluation)
        .service(run_evaluation)
        .service(set_vendor_decision);
}
