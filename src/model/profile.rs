use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dimension::Dimension;

/// Importance assumed when nothing says otherwise
pub const DEFAULT_IMPORTANCE: u8 = 3;
pub const MAX_IMPORTANCE: u8 = 5;

fn default_importance() -> u8 {
    DEFAULT_IMPORTANCE
}

/// Weight (0-5) for each dimension. All four are always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DimensionImportance {
    #[serde(default = "default_importance", alias = "security")]
    pub compliance: u8,
    #[serde(default = "default_importance")]
    pub interoperability: u8,
    #[serde(default = "default_importance", alias = "finance")]
    pub cost: u8,
    #[serde(default = "default_importance", alias = "support")]
    pub adoption: u8,
}

impl Default for DimensionImportance {
    fn default() -> Self {
        Self {
            compliance: DEFAULT_IMPORTANCE,
            interoperability: DEFAULT_IMPORTANCE,
            cost: DEFAULT_IMPORTANCE,
            adoption: DEFAULT_IMPORTANCE,
        }
    }
}

impl DimensionImportance {
    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Compliance => self.compliance,
            Dimension::Interoperability => self.interoperability,
            Dimension::Cost => self.cost,
            Dimension::Adoption => self.adoption,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: u8) {
        let value = value.min(MAX_IMPORTANCE);
        match dimension {
            Dimension::Compliance => self.compliance = value,
            Dimension::Interoperability => self.interoperability = value,
            Dimension::Cost => self.cost = value,
            Dimension::Adoption => self.adoption = value,
        }
    }

    /// Copy with every value clamped into 0..=5
    pub fn clamped(&self) -> Self {
        Self {
            compliance: self.compliance.min(MAX_IMPORTANCE),
            interoperability: self.interoperability.min(MAX_IMPORTANCE),
            cost: self.cost.min(MAX_IMPORTANCE),
            adoption: self.adoption.min(MAX_IMPORTANCE),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScaleAssumptions {
    pub users: Option<u32>,
    pub org_type: Option<String>,
    #[serde(default)]
    pub regions: Vec<String>,
}

/// Structured requirements extracted from a free-text use case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequirementProfile {
    #[serde(default)]
    pub critical_requirements: Vec<String>,
    #[serde(default)]
    pub nice_to_haves: Vec<String>,
    #[serde(default)]
    pub compliance_expectations: Vec<String>,
    #[serde(default)]
    pub dimension_importance: DimensionImportance,
    #[serde(default)]
    pub integration_targets: Vec<String>,
    #[serde(default)]
    pub scale_assumptions: ScaleAssumptions,
}
