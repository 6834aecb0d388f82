//! In-process evaluation store, used when PostgreSQL is unavailable

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{ListEvaluationsQuery, PaginatedEvaluations, total_pages};
use super::{DbError, EvaluationStore};
use crate::model::Evaluation;

#[derive(Default)]
pub struct InMemoryEvaluationStore {
    evaluations: RwLock<HashMap<String, Evaluation>>,
}

impl InMemoryEvaluationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EvaluationStore for InMemoryEvaluationStore {
    async fn create(&self, evaluation: &Evaluation) -> Result<(), DbError> {
        self.evaluations
            .write()
            .await
            .insert(evaluation.id.clone(), evaluation.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Evaluation, DbError> {
        self.evaluations
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(id.to_string()))
    }

    async fn list(&self, query: &ListEvaluationsQuery) -> Result<PaginatedEvaluations, DbError> {
        let (page, page_size) = query.paging();

        let mut matching: Vec<Evaluation> = self
            .evaluations
            .read()
            .await
            .values()
            .filter(|e| query.kind.is_none_or(|k| e.kind == k))
            .filter(|e| query.status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let total_count = matching.len() as i64;
        let evaluations = matching
            .into_iter()
            .skip(((page - 1) * page_size) as usize)
            .take(page_size as usize)
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
        self.create(evaluation).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}
