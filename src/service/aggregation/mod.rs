//! Cross-vendor aggregation and the final recommendation
//!
//! Scoring and selection are pure. The model only writes the narrative
//! around a choice that has already been made.

pub mod narrative;
pub mod prompts;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::findings::ExtractedComparison;
use crate::model::{
    AggregateRecommendation, Dimension, DimensionImportance, DimensionOutput, DimensionStatus,
    RankedVendor, RequirementProfile, VendorEvaluation,
};
use crate::service::llm::LlmClient;

/// Weighted mean over scored dimensions. Insufficient dimensions are left
/// out rather than counted as zero; a zero weight sum falls back to the plain
/// mean. `None` when nothing could be scored.
pub fn composite_score(
    outputs: &BTreeMap<Dimension, DimensionOutput>,
    importance: &DimensionImportance,
) -> Option<f64> {
    let scored: Vec<(f64, f64)> = outputs
        .iter()
        .filter(|(_, o)| o.status != DimensionStatus::InsufficientData)
        .filter_map(|(d, o)| o.score.map(|s| (s, importance.get(*d) as f64)))
        .collect();

    if scored.is_empty() {
        return None;
    }

    let weight_sum: f64 = scored.iter().map(|(_, w)| w).sum();
    let mean = if weight_sum > 0.0 {
        scored.iter().map(|(s, w)| s * w).sum::<f64>() / weight_sum
    } else {
        scored.iter().map(|(s, _)| s).sum::<f64>() / scored.len() as f64
    };

    Some((mean * 100.0).round() / 100.0)
}

/// Vendors ordered by composite (desc, unscored last), then official source
/// count (desc), then submission order
pub fn rank_vendors(vendors: &[VendorEvaluation]) -> Vec<RankedVendor> {
    let mut ranked: Vec<(usize, RankedVendor)> = vendors
        .iter()
        .enumerate()
        .map(|(i, v)| {
            (
                i,
                RankedVendor {
                    vendor_id: v.id.clone(),
                    vendor_name: v.name.clone(),
                    total_score: v.total_score,
                    official_sources: v.official_sources(),
                },
            )
        })
        .collect();

    ranked.sort_by(|(ia, a), (ib, b)| {
        let by_score = match (a.total_score, b.total_score) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_score
            .then_with(|| b.official_sources.cmp(&a.official_sources))
            .then_with(|| ia.cmp(ib))
    });

    ranked.into_iter().map(|(_, r)| r).collect()
}

/// Outcome of vendor selection
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Recommended(String),
    Refused(String),
}

/// Pick the vendor to recommend, or refuse with a reason
pub fn select_recommendation(vendors: &[VendorEvaluation]) -> Selection {
    if vendors.is_empty() {
        return Selection::Refused("No vendors were evaluated.".to_string());
    }

    let compliance_missing = vendors.iter().all(|v| {
        v.output(Dimension::Compliance)
            .is_none_or(|o| o.status == DimensionStatus::InsufficientData)
    });
    if compliance_missing {
        return Selection::Refused(
            "None of the evaluated vendors has verifiable security and compliance evidence \
             from official sources."
                .to_string(),
        );
    }

    if vendors.iter().all(|v| v.total_score.is_none()) {
        return Selection::Refused(
            "No vendor had enough verifiable evidence to be scored on any dimension.".to_string(),
        );
    }

    match rank_vendors(vendors).into_iter().next() {
        Some(top) => Selection::Recommended(top.vendor_id),
        None => Selection::Refused("No vendors were evaluated.".to_string()),
    }
}

pub struct RecommendationService {
    llm: LlmClient,
}

impl RecommendationService {
    pub fn new(llm: LlmClient) -> Self {
        tracing::info!(model = %llm.model_name(), "Recommendation service initialized");
        Self { llm }
    }

    /// Build the recommendation. The selected vendor never depends on the
    /// model; a failed narrative call falls back to templates.
    pub async fn recommend(
        &self,
        vendors: &[VendorEvaluation],
        profile: &RequirementProfile,
        use_case: &str,
    ) -> AggregateRecommendation {
        let ranking = rank_vendors(vendors);
        let per_vendor_fallback: BTreeMap<String, String> = vendors
            .iter()
            .map(|v| (v.id.clone(), narrative::vendor_overview(v)))
            .collect();
        let comparison_fallback: BTreeMap<Dimension, String> = Dimension::ALL
            .iter()
            .map(|d| (*d, narrative::dimension_comparison(*d, vendors)))
            .collect();

        let selected = match select_recommendation(vendors) {
            Selection::Recommended(id) => vendors
                .iter()
                .find(|v| v.id == id)
                .ok_or_else(|| "The selected vendor is not part of the evaluation.".to_string()),
            Selection::Refused(reason) => Err(reason),
        };
        let vendor = match selected {
            Ok(vendor) => vendor,
            Err(reason) => {
                tracing::info!(vendors = vendors.len(), reason = %reason, "No vendor recommended");
                return AggregateRecommendation {
                    recommended_vendor_id: String::new(),
                    short_reason: narrative::refusal_short(&reason),
                    detailed_reason: narrative::refusal_detail(&reason, vendors),
                    per_vendor_narrative: per_vendor_fallback,
                    comparison_narrative: comparison_fallback,
                    ranking,
                };
            }
        };

        let prompt = prompts::build_comparison_prompt(use_case, profile, vendors, vendor);
        let extracted = match self
            .llm
            .complete_json::<ExtractedComparison>(prompts::SYSTEM_PROMPT, &prompt)
            .await
        {
            Ok(extracted) => extracted,
            Err(e) => {
                tracing::warn!(error = %e, "Comparison narrative failed, using templates");
                ExtractedComparison::default()
            }
        };

        let recommendation = merge_narrative(
            extracted,
            vendors,
            vendor,
            &ranking,
            per_vendor_fallback,
            comparison_fallback,
        );

        tracing::info!(
            vendor = %vendor.name,
            total_score = ?vendor.total_score,
            candidates = vendors.len(),
            "Vendor recommended"
        );

        AggregateRecommendation {
            ranking,
            ..recommendation
        }
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// True when the selected vendor is the first vendor the text names. With
/// `exclusive`, naming any other vendor at all disqualifies the text.
fn argues_for(
    text: &str,
    selected: &VendorEvaluation,
    vendors: &[VendorEvaluation],
    exclusive: bool,
) -> bool {
    let lower = text.to_lowercase();
    let Some(selected_at) = lower.find(&selected.name.trim().to_lowercase()) else {
        return false;
    };
    vendors
        .iter()
        .filter(|v| v.id != selected.id && !v.name.trim().is_empty())
        .filter_map(|v| lower.find(&v.name.trim().to_lowercase()))
        .all(|at| !exclusive && at > selected_at)
}

/// Model reasoning that argues for the selected vendor, else `None`
fn consistent_reason(
    text: Option<String>,
    selected: &VendorEvaluation,
    vendors: &[VendorEvaluation],
    exclusive: bool,
) -> Option<String> {
    let text = non_blank(text)?;
    if argues_for(&text, selected, vendors, exclusive) {
        Some(text)
    } else {
        tracing::debug!(
            vendor = %selected.name,
            "Discarding model reasoning that does not argue for the selected vendor"
        );
        None
    }
}

/// Model text where present, templates for every gap
fn merge_narrative(
    extracted: ExtractedComparison,
    vendors: &[VendorEvaluation],
    selected: &VendorEvaluation,
    ranking: &[RankedVendor],
    mut per_vendor: BTreeMap<String, String>,
    mut comparison: BTreeMap<Dimension, String>,
) -> AggregateRecommendation {
    for (name, text) in extracted.per_vendor {
        let vendor = vendors
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name.trim()) || v.id == name);
        if let (Some(vendor), Some(text)) = (vendor, non_blank(Some(text))) {
            per_vendor.insert(vendor.id.clone(), text);
        }
    }

    for (key, text) in extracted.comparison {
        if let (Some(dimension), Some(text)) = (Dimension::from_key(&key), non_blank(Some(text))) {
            comparison.insert(dimension, text);
        }
    }

    AggregateRecommendation {
        recommended_vendor_id: selected.id.clone(),
        short_reason: consistent_reason(extracted.short_reason, selected, vendors, true)
            .unwrap_or_else(|| narrative::recommended_short(selected)),
        detailed_reason: consistent_reason(extracted.detailed_reason, selected, vendors, false)
            .unwrap_or_else(|| narrative::recommended_detail(selected, ranking)),
        per_vendor_narrative: per_vendor,
        comparison_narrative: comparison,
        ranking: Vec::new(),
    }
}
