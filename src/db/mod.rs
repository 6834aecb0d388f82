//! Evaluation persistence: PostgreSQL with an in-memory fallback

pub mod memory;
pub mod models;
pub mod repository;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

use crate::model::{Evaluation, EvaluationStatus};
use models::{ListEvaluationsQuery, PaginatedEvaluations};

pub use memory::InMemoryEvaluationStore;
pub use repository::PgEvaluationStore;

// Environment variable names
const ENV_POSTGRES_HOST: &str = "VENDORLENS_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "VENDORLENS_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "VENDORLENS_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "VENDORLENS_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "VENDORLENS_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "vendorlens";
const DEFAULT_POSTGRES_PASSWORD: &str = "vendorlens";
const DEFAULT_POSTGRES_DB: &str = "vendorlens";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Storage for evaluation documents
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    async fn create(&self, evaluation: &Evaluation) -> Result<(), DbError>;

    async fn get(&self, id: &str) -> Result<Evaluation, DbError>;

    async fn list(&self, query: &ListEvaluationsQuery) -> Result<PaginatedEvaluations, DbError>;

    /// Insert or replace the whole document
    async fn save(&self, evaluation: &Evaluation) -> Result<(), DbError>;

    async fn ping(&self) -> Result<(), DbError>;

    /// Set status and error message, returning the updated evaluation
    async fn update_status(
        &self,
        id: &str,
        status: EvaluationStatus,
        error: Option<&str>,
    ) -> Result<Evaluation, DbError> {
        let mut evaluation = self.get(id).await?;
        evaluation.status = status;
        evaluation.error = error.map(str::to_string);
        evaluation.updated_at = Utc::now();
        self.save(&evaluation).await?;
        Ok(evaluation)
    }
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    );

    tracing::debug!(host = %host, port = %port, database = %database, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

    Ok(pool)
}

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS evaluations (
            id VARCHAR(64) PRIMARY KEY,
            kind VARCHAR(32) NOT NULL,
            status VARCHAR(32) NOT NULL,
            document JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_evaluations_status ON evaluations(status)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_evaluations_created_at ON evaluations(created_at)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database schema initialized");

    Ok(())
}
