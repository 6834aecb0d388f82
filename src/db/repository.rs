//! PostgreSQL store for evaluation documents

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{EvaluationRow, ListEvaluationsQuery, PaginatedEvaluations, total_pages};
use super::{DbError, EvaluationStore};
use crate::model::Evaluation;

/// Evaluations stored as JSONB documents, with kind and status as columns
#[derive(Clone)]
pub struct PgEvaluationStore {
    pool: PgPool,
}

impl PgEvaluationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn document(evaluation: &Evaluation) -> Result<serde_json::Value, DbError> {
        serde_json::to_value(evaluation).map_err(|e| DbError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl EvaluationStore for PgEvaluationStore {
    async fn create(&self, evaluation: &Evaluation) -> Result<(), DbError> {
        let document = Self::document(evaluation)?;

        sqlx::query(
            r#"
            INSERT INTO evaluations (id, kind, status, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&evaluation.id)
        .bind(evaluation.kind.as_str())
        .bind(evaluation.status.as_str())
        .bind(&document)
        .bind(evaluation.created_at)
        .bind(evaluation.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %evaluation.id, "Created evaluation");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Evaluation, DbError> {
        let row: EvaluationRow = sqlx::query_as(
            r#"
            SELECT id, kind, status, document, created_at, updated_at
            FROM evaluations WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(id.to_string()))?;

        row.into_domain().map_err(DbError::Serialization)
    }

    async fn list(&self, query: &ListEvaluationsQuery) -> Result<PaginatedEvaluations, DbError> {
        let (page, page_size) = query.paging();
        let offset = (page - 1) * page_size;

        // Build dynamic query
        let mut conditions = Vec::new();
        let mut params: Vec<&'static str> = Vec::new();

        if let Some(kind) = query.kind {
            params.push(kind.as_str());
            conditions.push(format!("kind = ${}", params.len()));
        }

        if let Some(status) = query.status {
            params.push(status.as_str());
            conditions.push(format!("status = ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) as count FROM evaluations {}", where_clause);

        let total_count: i64 = {
            let mut q = sqlx::query_scalar(&count_query);
            for param in &params {
                q = q.bind(*param);
            }
            q.fetch_one(&self.pool).await?
        };

        let select_query = format!(
            r#"
            SELECT id, kind, status, document, created_at, updated_at
            FROM evaluations
            {}
            ORDER BY created_at DESC
            LIMIT {} OFFSET {}
            "#,
            where_clause, page_size, offset
        );

        let rows: Vec<EvaluationRow> = {
            let mut q = sqlx::query_as(&select_query);
            for param in &params {
                q = q.bind(*param);
            }
            q.fetch_all(&self.pool).await?
        };

        let evaluations: Vec<Evaluation> = rows
            .into_iter()
            .filter_map(|row| match row.into_domain() {
                Ok(evaluation) => Some(evaluation),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable evaluation");
                    None
                }
            })
            .collect();

        Ok(PaginatedEvaluations {
            evaluations,
            page,
            page_size,
            total_count,
            total_pages: total_pages(total_count, page_size),
        })
    }

    async fn save(&self, evaluation: &Evaluation) -> Result<(), DbError> {
        let document = Self::document(evaluation)?;

        sqlx::query(
            r#"
            INSERT INTO evaluations (id, kind, status, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                kind = EXCLUDED.kind,
                status = EXCLUDED.status,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&evaluation.id)
        .bind(evaluation.kind.as_str())
        .bind(evaluation.status.as_str())
        .bind(&document)
        .bind(evaluation.created_at)
        .bind(evaluation.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %evaluation.id, status = %evaluation.status, "Saved evaluation");
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
