use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::evidence::{Source, official_count};

/// The four fixed evaluation dimensions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Compliance,
    Interoperability,
    Cost,
    Adoption,
}

impl Dimension {
    /// Evaluation order used by the pipeline
    pub const ALL: [Dimension; 4] = [
        Dimension::Compliance,
        Dimension::Interoperability,
        Dimension::Cost,
        Dimension::Adoption,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Compliance => "compliance",
            Dimension::Interoperability => "interoperability",
            Dimension::Cost => "cost",
            Dimension::Adoption => "adoption",
        }
    }

    /// Parse a dimension key, accepting the legacy aliases
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "compliance" | "security" => Some(Dimension::Compliance),
            "interoperability" => Some(Dimension::Interoperability),
            "cost" | "finance" => Some(Dimension::Cost),
            "adoption" | "support" => Some(Dimension::Adoption),
            _ => None,
        }
    }

    /// Human-readable label used in narratives
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Compliance => "Security & Compliance",
            Dimension::Interoperability => "Interoperability",
            Dimension::Cost => "Cost & TCO",
            Dimension::Adoption => "Adoption & Support",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DimensionStatus {
    Ok,
    InsufficientData,
    Risk,
}

impl DimensionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DimensionStatus::Ok => "ok",
            DimensionStatus::InsufficientData => "insufficient data",
            DimensionStatus::Risk => "risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentStatus {
    Met,
    Unmet,
}

/// Status and optional score produced by status determination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub status: DimensionStatus,
    pub score: Option<f64>,
}

impl Verdict {
    pub fn insufficient() -> Self {
        Self {
            status: DimensionStatus::InsufficientData,
            score: None,
        }
    }

    pub fn risk(score: f64) -> Self {
        Self {
            status: DimensionStatus::Risk,
            score: Some(score.clamp(0.0, 5.0)),
        }
    }

    pub fn ok(score: f64) -> Self {
        Self {
            status: DimensionStatus::Ok,
            score: Some(score.clamp(0.0, 5.0)),
        }
    }
}

/// Rough total cost of ownership derived from pricing findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TcoEstimate {
    pub users: u32,
    pub per_user_monthly: f64,
    /// True when no price was found and the industry default was used
    pub price_assumed: bool,
    pub year1_total: f64,
    pub annual_ongoing: f64,
    pub three_year_total: f64,
    pub pricing_model: String,
}

/// Per-dimension verdict for one vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DimensionOutput {
    pub status: DimensionStatus,
    /// 0-5, absent whenever status is `insufficient_data`
    pub score: Option<f64>,
    pub findings: Vec<String>,
    pub sources: Vec<Source>,
    pub confidence: Confidence,
    pub recommendations: Vec<String>,
    pub requirements_alignment: BTreeMap<String, AlignmentStatus>,
    pub unmet_requirements: Vec<String>,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<TcoEstimate>,
}

impl DimensionOutput {
    /// Assemble an output from a verdict, keeping the score/status and
    /// confidence/sources invariants intact
    pub fn from_verdict(
        verdict: Verdict,
        confidence: Confidence,
        findings: Vec<String>,
        sources: Vec<Source>,
        requirements_alignment: BTreeMap<String, AlignmentStatus>,
    ) -> Self {
        let score = match verdict.status {
            DimensionStatus::InsufficientData => None,
            _ => verdict.score,
        };
        let confidence = if sources.is_empty() {
            Confidence::Low
        } else {
            confidence
        };
        let unmet_requirements = requirements_alignment
            .iter()
            .filter(|(_, status)| **status == AlignmentStatus::Unmet)
            .map(|(req, _)| req.clone())
            .collect();

        Self {
            status: verdict.status,
            score,
            findings,
            sources,
            confidence,
            recommendations: Vec::new(),
            requirements_alignment,
            unmet_requirements,
            notes: String::new(),
            cost_estimate: None,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.status != DimensionStatus::InsufficientData && self.score.is_some()
    }

    pub fn official_sources(&self) -> usize {
        official_count(&self.sources)
    }

    pub fn met_requirements(&self) -> usize {
        self.requirements_alignment
            .values()
            .filter(|s| **s == AlignmentStatus::Met)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_verdict_drops_score() {
        let verdict = Verdict {
            status: DimensionStatus::InsufficientData,
            score: Some(3.0),
        };
        let output =
            DimensionOutput::from_verdict(verdict, Confidence::High, vec![], vec![], BTreeMap::new());

        assert_eq!(output.score, None);
        assert_eq!(output.confidence, Confidence::Low);
        assert!(!output.is_scored());
    }

    #[test]
    fn test_unmet_requirements_follow_alignment() {
        let mut alignment = BTreeMap::new();
        alignment.insert("GDPR".to_string(), AlignmentStatus::Met);
        alignment.insert("HIPAA".to_string(), AlignmentStatus::Unmet);

        let output = DimensionOutput::from_verdict(
            Verdict::ok(4.0),
            Confidence::Medium,
            vec![],
            vec![],
            alignment,
        );

        assert_eq!(output.unmet_requirements, vec!["HIPAA".to_string()]);
        assert_eq!(output.met_requirements(), 1);
    }

    #[test]
    fn test_dimension_serializes_as_map_key() {
        let mut map = BTreeMap::new();
        map.insert(Dimension::Cost, 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"cost":1}"#);

        let parsed: BTreeMap<Dimension, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.get(&Dimension::Cost), Some(&1));
    }
}
