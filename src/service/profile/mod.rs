//! Requirement profile builder
//!
//! One structured LLM call turns the use case into a [`RequirementProfile`].
//! Keyword heuristics fill the lists the model leaves out, and replace the
//! model when the call fails. Dimension importance comes from the model
//! alone; every key it omits stays at the default of 3.

pub mod heuristics;
pub mod prompts;

use serde_json::Value;

use crate::model::findings::ExtractedProfile;
use crate::model::profile::MAX_IMPORTANCE;
use crate::model::{Dimension, DimensionImportance, RequirementProfile, ScaleAssumptions};
use crate::service::llm::LlmClient;

pub struct RequirementProfileService {
    llm: LlmClient,
}

impl RequirementProfileService {
    pub fn new(llm: LlmClient) -> Self {
        tracing::info!(model = %llm.model_name(), "Requirement profile service initialized");
        Self { llm }
    }

    /// Build the profile. Never fails; a blank use case yields the defaults.
    pub async fn build(&self, use_case: &str) -> RequirementProfile {
        if use_case.trim().is_empty() {
            return RequirementProfile::default();
        }

        let start_time = std::time::Instant::now();
        let fallback = heuristics::heuristic_profile(use_case);
        let prompt = prompts::build_profile_prompt(use_case);

        match self
            .llm
            .complete_json::<ExtractedProfile>(prompts::SYSTEM_PROMPT, &prompt)
            .await
        {
            Ok(extracted) => {
                let profile = merge_profile(extracted, fallback);
                tracing::info!(
                    critical = profile.critical_requirements.len(),
                    compliance = profile.compliance_expectations.len(),
                    integrations = profile.integration_targets.len(),
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Requirement profile extracted"
                );
                profile
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile extraction failed, using keyword heuristics");
                fallback
            }
        }
    }
}

/// Number or numeric string
fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    };
    parsed.filter(|v: &f64| v.is_finite())
}

/// Trim, drop blanks and dedupe case-insensitively, keeping first spellings
fn clean_list(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !cleaned.iter().any(|c| c.eq_ignore_ascii_case(item)) {
            cleaned.push(item.to_string());
        }
    }
    cleaned
}

fn merge_importance(extracted: &std::collections::BTreeMap<String, Value>) -> DimensionImportance {
    let mut importance = DimensionImportance::default();
    for (key, value) in extracted {
        let Some(dimension) = Dimension::from_key(key) else {
            tracing::debug!(key = %key, "Ignoring unknown dimension importance key");
            continue;
        };
        if let Some(v) = value_as_f64(value) {
            let v = v.round().clamp(0.0, MAX_IMPORTANCE as f64) as u8;
            importance.set(dimension, v);
        }
    }
    importance
}

/// Model output first, heuristic lists for anything missing. Detected
/// integration targets are always merged in.
fn merge_profile(extracted: ExtractedProfile, fallback: RequirementProfile) -> RequirementProfile {
    let or_fallback = |items: Vec<String>, fallback: Vec<String>| {
        let items = clean_list(items);
        if items.is_empty() { fallback } else { items }
    };

    let users = extracted
        .scale_assumptions
        .users
        .as_ref()
        .and_then(value_as_f64)
        .filter(|u| *u >= 1.0)
        .map(|u| u.round().min(u32::MAX as f64) as u32)
        .or(fallback.scale_assumptions.users);

    RequirementProfile {
        critical_requirements: clean_list(extracted.critical_requirements),
        nice_to_haves: clean_list(extracted.nice_to_haves),
        compliance_expectations: or_fallback(
            extracted.compliance_expectations,
            fallback.compliance_expectations,
        ),
        dimension_importance: merge_importance(&extracted.dimension_importance),
        integration_targets: clean_list(
            extracted
                .integration_targets
                .into_iter()
                .chain(fallback.integration_targets),
        ),
        scale_assumptions: ScaleAssumptions {
            users,
            org_type: extracted
                .scale_assumptions
                .org_type
                .filter(|o| !o.trim().is_empty()),
            regions: clean_list(extracted.scale_assumptions.regions),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::profile::DEFAULT_IMPORTANCE;
    use crate::service::llm::testing::{ScriptedChatModel, client};

    #[tokio::test]
    async fn test_blank_use_case_skips_model() {
        let model = ScriptedChatModel::unavailable();
        let service = RequirementProfileService::new(client(model.clone()));

        let profile = service.build("   ").await;

        assert_eq!(profile, RequirementProfile::default());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_profile_is_normalized() {
        let model = ScriptedChatModel::new(|_| {
            Ok(r#"```json
            {
                "critical_requirements": ["SSO/SAML", " sso/saml ", ""],
                "compliance_expectations": ["SOC 2 Type II"],
                "dimension_importance": {"security": 5, "cost": "9", "adoption": 1.4, "vibes": 2},
                "integration_targets": ["Slack"],
                "scale_assumptions": {"users": "250", "regions": ["EU"]}
            }
            ```"#
                .to_string())
        });
        let service = RequirementProfileService::new(client(model));

        let profile = service
            .build("Chat tool for 250 users that works with Okta and Slack")
            .await;

        assert_eq!(profile.critical_requirements, vec!["SSO/SAML"]);
        assert_eq!(profile.compliance_expectations, vec!["SOC 2 Type II"]);
        assert_eq!(profile.dimension_importance.compliance, 5);
        assert_eq!(profile.dimension_importance.cost, MAX_IMPORTANCE);
        assert_eq!(profile.dimension_importance.adoption, 1);
        assert_eq!(
            profile.dimension_importance.interoperability,
            DEFAULT_IMPORTANCE
        );
        assert_eq!(profile.integration_targets, vec!["Slack", "Okta"]);
        assert_eq!(profile.scale_assumptions.users, Some(250));
        assert_eq!(profile.scale_assumptions.regions, vec!["EU"]);
    }

    #[tokio::test]
    async fn test_model_failure_uses_heuristic_lists() {
        let service = RequirementProfileService::new(client(ScriptedChatModel::unavailable()));

        let profile = service
            .build("Regulated fintech, 200-500 users, needs Okta SSO and GDPR")
            .await;

        assert_eq!(profile.dimension_importance, DimensionImportance::default());
        assert_eq!(profile.integration_targets, vec!["Okta", "SSO"]);
        assert_eq!(profile.compliance_expectations, vec!["GDPR"]);
        assert_eq!(profile.scale_assumptions.users, Some(350));
        assert!(profile.critical_requirements.is_empty());
    }

    #[tokio::test]
    async fn test_omitted_importance_keys_default() {
        let model = ScriptedChatModel::new(|_| {
            Ok(r#"{"dimension_importance": {"security": 5}}"#.to_string())
        });
        let service = RequirementProfileService::new(client(model));

        let profile = service
            .build("Regulated fintech on a tight budget, needs training for 200 staff")
            .await;

        assert_eq!(
            profile.dimension_importance,
            DimensionImportance {
                compliance: 5,
                interoperability: DEFAULT_IMPORTANCE,
                cost: DEFAULT_IMPORTANCE,
                adoption: DEFAULT_IMPORTANCE,
            }
        );
        assert_eq!(profile.scale_assumptions.users, Some(200));
    }
}
