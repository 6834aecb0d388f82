//! Per-dimension vendor evaluation
//!
//! Collects evidence for the dimension's topic, extracts structured findings
//! with the LLM, aligns requirements and derives a bounded verdict.

pub mod alignment;
pub mod cost;
pub mod prompts;
pub mod status;

use std::sync::Arc;

use crate::model::findings::{
    AdoptionFindings, ComplianceFindings, DimensionFindings, InteroperabilityFindings,
    PricingFindings,
};
use crate::model::{
    Dimension, DimensionOutput, DimensionStatus, EventKind, PipelineEvent, RequirementProfile,
    Source,
};
use crate::service::events::EventSender;
use crate::service::evidence::domains::normalize_url;
use crate::service::evidence::{EvidenceCollector, VendorRef};
use crate::service::llm::{LlmClient, LlmError};

use alignment::align_with_sources;
use status::{confidence_for, count_polarity, determine_status};

const MAX_RECOMMENDATIONS: usize = 4;
/// Integration targets researched individually by the interoperability evaluator
const MAX_TARGET_SEARCHES: usize = 2;

/// Evaluates one dimension for any vendor
pub struct DimensionEvaluator {
    dimension: Dimension,
    collector: Arc<EvidenceCollector>,
    llm: LlmClient,
}

impl DimensionEvaluator {
    pub fn new(dimension: Dimension, collector: Arc<EvidenceCollector>, llm: LlmClient) -> Self {
        tracing::debug!(dimension = %dimension, model = %llm.model_name(), "Dimension evaluator initialized");
        Self {
            dimension,
            collector,
            llm,
        }
    }

    /// One evaluator per dimension, in evaluation order
    pub fn all(collector: Arc<EvidenceCollector>, llm: LlmClient) -> Vec<Self> {
        Dimension::ALL
            .iter()
            .map(|d| Self::new(*d, Arc::clone(&collector), llm.clone()))
            .collect()
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Evaluate the vendor. Never fails: missing evidence yields
    /// `insufficient_data` with an explanation.
    pub async fn evaluate(
        &self,
        vendor: VendorRef<'_>,
        profile: &RequirementProfile,
        events: &EventSender,
    ) -> DimensionOutput {
        let start_time = std::time::Instant::now();
        let stage = format!("dimension:{}", self.dimension);
        let event = |kind: EventKind, message: String| {
            PipelineEvent::new(kind, stage.clone(), message)
                .with_vendor(vendor.name)
                .with_dimension(self.dimension)
        };

        events.emit(event(
            EventKind::StageThinking,
            format!("Searching public sources for {} evidence", self.dimension.label()),
        ));

        let sources = self.collect_sources(vendor, profile).await;
        let official = sources.iter().filter(|s| s.is_official()).count();

        events.emit(event(
            EventKind::StageProgress,
            format!(
                "Collected {} sources ({} official)",
                sources.len(),
                official
            ),
        ));

        let requirements = requirements_for(self.dimension, profile);

        let findings = if sources.is_empty() {
            None
        } else {
            events.emit(event(
                EventKind::StageThinking,
                "Extracting findings from sources".to_string(),
            ));
            let extracted = self
                .extract_findings(vendor, profile, &requirements, &sources)
                .await;
            Some(extracted.unwrap_or_else(|e| {
                tracing::warn!(
                    vendor = %vendor.name,
                    dimension = %self.dimension,
                    error = %e,
                    "Findings extraction failed, continuing with empty findings"
                );
                events.emit(event(
                    EventKind::StageError,
                    format!("Findings extraction failed: {}", e),
                ));
                DimensionFindings::empty(self.dimension)
            }))
        };

        let flat = match &findings {
            Some(findings) => findings.to_findings(),
            None => vec![format!(
                "No {} evidence could be retrieved from public sources",
                self.dimension.label()
            )],
        };

        let alignment = align_with_sources(&flat, &sources, &requirements);
        let met = alignment
            .values()
            .filter(|s| **s == crate::model::AlignmentStatus::Met)
            .count();
        let verdict = determine_status(&flat, &sources, met);
        let confidence = confidence_for(&sources);

        let mut output =
            DimensionOutput::from_verdict(verdict, confidence, flat, sources, alignment);
        output.recommendations = build_recommendations(self.dimension, vendor.name, &output);
        output.notes = build_notes(self.dimension, vendor.name, &output);

        if self.dimension == Dimension::Cost {
            let pricing = match &findings {
                Some(DimensionFindings::Cost(p)) => p.clone(),
                _ => PricingFindings::default(),
            };
            output.cost_estimate = Some(cost::estimate_tco(
                &pricing,
                profile.scale_assumptions.users,
            ));
        }

        tracing::info!(
            vendor = %vendor.name,
            dimension = %self.dimension,
            status = ?output.status,
            score = ?output.score,
            sources = output.sources.len(),
            official,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Dimension evaluated"
        );

        output
    }

    async fn collect_sources(
        &self,
        vendor: VendorRef<'_>,
        profile: &RequirementProfile,
    ) -> Vec<Source> {
        let mut sources = self
            .collector
            .collect(prompts::topic_query(self.dimension), vendor)
            .await;

        if self.dimension == Dimension::Interoperability {
            for target in profile.integration_targets.iter().take(MAX_TARGET_SEARCHES) {
                let query = format!("{} integration", target);
                let extra = self.collector.collect(&query, vendor).await;
                merge_sources(&mut sources, extra);
            }
        }

        sources
    }

    /// One structured LLM call, typed per dimension
    async fn extract_findings(
        &self,
        vendor: VendorRef<'_>,
        profile: &RequirementProfile,
        requirements: &[String],
        sources: &[Source],
    ) -> Result<DimensionFindings, LlmError> {
        let system = prompts::system_prompt(self.dimension);
        let prompt =
            prompts::build_findings_prompt(vendor.name, self.dimension, requirements, profile, sources);

        match self.dimension {
            Dimension::Compliance => self
                .llm
                .complete_json::<ComplianceFindings>(&system, &prompt)
                .await
                .map(DimensionFindings::Compliance),
            Dimension::Interoperability => self
                .llm
                .complete_json::<InteroperabilityFindings>(&system, &prompt)
                .await
                .map(DimensionFindings::Interoperability),
            Dimension::Cost => self
                .llm
                .complete_json::<PricingFindings>(&system, &prompt)
                .await
                .map(DimensionFindings::Cost),
            Dimension::Adoption => self
                .llm
                .complete_json::<AdoptionFindings>(&system, &prompt)
                .await
                .map(DimensionFindings::Adoption),
        }
    }
}

/// Append sources whose URL is not already present
fn merge_sources(sources: &mut Vec<Source>, extra: Vec<Source>) {
    for source in extra {
        let key = url::Url::parse(&source.url)
            .map(|u| normalize_url(&u))
            .unwrap_or_else(|_| source.url.to_lowercase());
        let duplicate = sources.iter().any(|s| {
            url::Url::parse(&s.url)
                .map(|u| normalize_url(&u))
                .unwrap_or_else(|_| s.url.to_lowercase())
                == key
        });
        if !duplicate {
            sources.push(source);
        }
    }
}

/// Requirements checked for a dimension, case-insensitively deduplicated
pub fn requirements_for(dimension: Dimension, profile: &RequirementProfile) -> Vec<String> {
    let candidates: Vec<&String> = match dimension {
        Dimension::Compliance => profile
            .compliance_expectations
            .iter()
            .chain(profile.critical_requirements.iter())
            .collect(),
        Dimension::Interoperability => profile.integration_targets.iter().collect(),
        Dimension::Cost | Dimension::Adoption => Vec::new(),
    };

    let mut requirements: Vec<String> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        if !requirements
            .iter()
            .any(|r| r.eq_ignore_ascii_case(candidate))
        {
            requirements.push(candidate.to_string());
        }
    }
    requirements
}

/// Status action first, then one per unmet requirement, at most four
fn build_recommendations(
    dimension: Dimension,
    vendor_name: &str,
    output: &DimensionOutput,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    match output.status {
        DimensionStatus::InsufficientData => {
            let pack = match dimension {
                Dimension::Compliance => {
                    "the formal security and compliance pack (SOC 2 report, ISO 27001 certificate, DPA)"
                }
                Dimension::Interoperability => "API documentation and the integration catalogue",
                Dimension::Cost => "a formal quote including implementation and support fees",
                Dimension::Adoption => "support SLA terms and a proposed onboarding plan",
            };
            recommendations.push(format!("Request {} directly from {}", pack, vendor_name));
        }
        DimensionStatus::Risk => recommendations.push(format!(
            "Escalate {} concerns about {} to a formal review before contracting",
            dimension.label(),
            vendor_name
        )),
        DimensionStatus::Ok => {
            if output.confidence != crate::model::Confidence::High {
                recommendations.push(format!(
                    "Validate {} findings with {} during due diligence",
                    dimension.label(),
                    vendor_name
                ));
            }
        }
    }

    for requirement in &output.unmet_requirements {
        recommendations.push(format!(
            "Obtain written confirmation of {} from {}",
            requirement, vendor_name
        ));
    }

    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

fn build_notes(dimension: Dimension, vendor_name: &str, output: &DimensionOutput) -> String {
    let label = dimension.label();
    let official = output.official_sources();
    let counts = count_polarity(&output.findings);

    let mut notes = match output.status {
        DimensionStatus::InsufficientData if output.sources.is_empty() => format!(
            "No {} evidence could be retrieved from public sources for {}. \
             This dimension is excluded from the overall score.",
            label, vendor_name
        ),
        DimensionStatus::InsufficientData if official == 0 => format!(
            "Only third-party or community sources were found for {} ({} in total). \
             Without official documentation this dimension is not scored.",
            vendor_name,
            output.sources.len()
        ),
        DimensionStatus::InsufficientData => format!(
            "Official sources for {} did not contain conclusive {} findings.",
            vendor_name, label
        ),
        DimensionStatus::Risk => format!(
            "{} of {} {} findings for {} point to gaps or unverifiable claims. \
             Treat this dimension as a risk until clarified.",
            counts.negative,
            counts.total(),
            label,
            vendor_name
        ),
        DimensionStatus::Ok => format!(
            "{} of {} findings support {}'s {} posture, based on {} official source(s).",
            counts.positive,
            counts.total(),
            vendor_name,
            label,
            official
        ),
    };

    if !output.requirements_alignment.is_empty() {
        notes.push_str(&format!(
            " {} of {} requirements met.",
            output.met_requirements(),
            output.requirements_alignment.len()
        ));
    }

    notes
}
