use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::dimension::{Dimension, DimensionOutput};
use super::profile::{DimensionImportance, RequirementProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    /// Multi-vendor comparison, the only kind the pipeline runs
    Assessment,
    /// Single-vendor onboarding request
    Application,
}

impl EvaluationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationKind::Assessment => "assessment",
            EvaluationKind::Application => "application",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Pending => "pending",
            EvaluationStatus::Running => "running",
            EvaluationStatus::Completed => "completed",
            EvaluationStatus::Failed => "failed",
            EvaluationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Procurement lifecycle of a vendor, independent from scoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VendorDecision {
    #[default]
    Pending,
    Approved,
    ApprovedPendingActions,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VendorEvaluation {
    pub id: String,
    pub name: String,
    pub website: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub dimension_outputs: BTreeMap<Dimension, DimensionOutput>,
    /// Weighted mean of scored dimensions, absent when none could be scored
    pub total_score: Option<f64>,
    #[serde(default)]
    pub decision: VendorDecision,
}

impl VendorEvaluation {
    pub fn new(name: impl Into<String>, website: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            website,
            dimension_outputs: BTreeMap::new(),
            total_score: None,
            decision: VendorDecision::default(),
        }
    }

    pub fn output(&self, dimension: Dimension) -> Option<&DimensionOutput> {
        self.dimension_outputs.get(&dimension)
    }

    /// Official sources across every dimension
    pub fn official_sources(&self) -> usize {
        self.dimension_outputs
            .values()
            .map(|o| o.official_sources())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankedVendor {
    pub vendor_id: String,
    pub vendor_name: String,
    pub total_score: Option<f64>,
    pub official_sources: usize,
}

/// Final cross-vendor recommendation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AggregateRecommendation {
    /// Empty when no vendor can be safely recommended
    pub recommended_vendor_id: String,
    pub short_reason: String,
    pub detailed_reason: String,
    pub per_vendor_narrative: BTreeMap<String, String>,
    #[schema(value_type = Object)]
    pub comparison_narrative: BTreeMap<Dimension, String>,
    #[serde(default)]
    pub ranking: Vec<RankedVendor>,
}

impl AggregateRecommendation {
    pub fn is_refusal(&self) -> bool {
        self.recommended_vendor_id.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Evaluation {
    pub id: String,
    pub kind: EvaluationKind,
    pub name: String,
    pub use_case: String,
    pub status: EvaluationStatus,
    /// Explicit user weights, overriding inferred importance
    pub weights: Option<DimensionImportance>,
    pub requirement_profile: Option<RequirementProfile>,
    pub vendors: Vec<VendorEvaluation>,
    pub recommendation: Option<AggregateRecommendation>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn new(
        kind: EvaluationKind,
        name: impl Into<String>,
        use_case: impl Into<String>,
        vendors: Vec<VendorEvaluation>,
        weights: Option<DimensionImportance>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            name: name.into(),
            use_case: use_case.into(),
            status: EvaluationStatus::Pending,
            weights: weights.map(|w| w.clamped()),
            requirement_profile: None,
            vendors,
            recommendation: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn vendor_mut(&mut self, vendor_id: &str) -> Option<&mut VendorEvaluation> {
        self.vendors.iter_mut().find(|v| v.id == vendor_id)
    }
}
