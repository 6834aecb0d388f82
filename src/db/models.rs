//! Database models for evaluations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::model::{Evaluation, EvaluationKind, EvaluationStatus};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Database representation of an evaluation
#[derive(Debug, Clone, FromRow)]
pub struct EvaluationRow {
    pub id: String,
    pub kind: String,
    pub status: String,
    pub document: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvaluationRow {
    /// Convert database row to domain model. Columns win over the document
    /// for the fields they index.
    pub fn into_domain(self) -> Result<Evaluation, String> {
        let mut evaluation: Evaluation = serde_json::from_value(self.document)
            .map_err(|e| format!("Invalid evaluation document {}: {}", self.id, e))?;

        if let Some(status) = parse_status(&self.status) {
            evaluation.status = status;
        }
        evaluation.updated_at = self.updated_at;
        evaluation.created_at = self.created_at;
        Ok(evaluation)
    }
}

pub fn parse_status(value: &str) -> Option<EvaluationStatus> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).ok()
}

/// Query parameters for listing evaluations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEvaluationsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub kind: Option<EvaluationKind>,
    pub status: Option<EvaluationStatus>,
}

impl ListEvaluationsQuery {
    /// (page, page_size) with defaults and bounds applied
    pub fn paging(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, page_size)
    }
}

/// Paginated response for evaluations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedEvaluations {
    pub evaluations: Vec<Evaluation>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: i64,
    pub total_pages: u32,
}

pub fn total_pages(total_count: i64, page_size: u32) -> u32 {
    ((total_count as f64) / (page_size as f64)).ceil() as u32
}
