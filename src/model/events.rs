use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dimension::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StageStart,
    StageThinking,
    StageProgress,
    StageComplete,
    StageError,
    WorkflowComplete,
    WorkflowError,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::StageStart => "stage_start",
            EventKind::StageThinking => "stage_thinking",
            EventKind::StageProgress => "stage_progress",
            EventKind::StageComplete => "stage_complete",
            EventKind::StageError => "stage_error",
            EventKind::WorkflowComplete => "workflow_complete",
            EventKind::WorkflowError => "workflow_error",
        }
    }

    /// Terminal events end the stream after delivery
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::WorkflowComplete | EventKind::WorkflowError)
    }
}

/// Progress notification emitted by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PipelineEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PipelineEvent {
    pub fn new(kind: EventKind, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage: stage.into(),
            vendor: None,
            dimension: None,
            message: message.into(),
            data: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}
