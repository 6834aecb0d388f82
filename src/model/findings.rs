//! Structured shapes the language model is asked to fill in
//!
//! Every field defaults so a partially filled answer still parses.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::dimension::Dimension;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComplianceFindings {
    #[serde(default)]
    #[schemars(description = "Security certifications with status, e.g. 'SOC 2 Type II certified'")]
    pub certifications: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Privacy regulation statements (GDPR, CCPA, HIPAA, DPA availability)")]
    pub privacy: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Data residency, retention, deletion and encryption practices")]
    pub data_handling: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Security features such as SSO, MFA, RBAC, audit logs")]
    pub security_features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InteroperabilityFindings {
    #[serde(default)]
    #[schemars(description = "SSO and identity provider support (SAML, OIDC, SCIM)")]
    pub sso: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Public APIs (REST, GraphQL, SOAP) and developer documentation")]
    pub apis: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Webhooks and event subscriptions")]
    pub webhooks: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Pre-built integrations with named products")]
    pub integrations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PricingFindings {
    #[serde(default)]
    #[schemars(description = "Published prices and plan tiers, including per-user amounts")]
    pub pricing: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Implementation, onboarding or professional services fees")]
    pub implementation_costs: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Support plan costs")]
    pub support_costs: Vec<String>,

    #[serde(default)]
    #[schemars(description = "One of: per_user, tiered, custom_quote, usage_based, undetermined")]
    pub pricing_model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdoptionFindings {
    #[serde(default)]
    #[schemars(description = "Support channels and hours (chat, phone, email, 24/7)")]
    pub support_channels: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Onboarding and implementation programme")]
    pub onboarding: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Training resources, academies, certification programmes")]
    pub training: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Support SLAs and uptime commitments")]
    pub sla: Vec<String>,
}

/// Findings for one dimension, one variant per schema
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionFindings {
    Compliance(ComplianceFindings),
    Interoperability(InteroperabilityFindings),
    Cost(PricingFindings),
    Adoption(AdoptionFindings),
}

impl DimensionFindings {
    /// The empty value for a dimension, used when extraction fails
    pub fn empty(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Compliance => Self::Compliance(ComplianceFindings::default()),
            Dimension::Interoperability => {
                Self::Interoperability(InteroperabilityFindings::default())
            }
            Dimension::Cost => Self::Cost(PricingFindings::default()),
            Dimension::Adoption => Self::Adoption(AdoptionFindings::default()),
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Self::Compliance(_) => Dimension::Compliance,
            Self::Interoperability(_) => Dimension::Interoperability,
            Self::Cost(_) => Dimension::Cost,
            Self::Adoption(_) => Dimension::Adoption,
        }
    }

    /// Each category with the statement used when it came back empty
    fn categories(&self) -> Vec<(&[String], &'static str)> {
        match self {
            Self::Compliance(f) => vec![
                (
                    f.certifications.as_slice(),
                    "No specific security certifications documented in available sources",
                ),
                (
                    f.privacy.as_slice(),
                    "Privacy compliance details not clearly documented",
                ),
                (
                    f.data_handling.as_slice(),
                    "Data handling and retention practices not clearly documented",
                ),
                (
                    f.security_features.as_slice(),
                    "Security controls (SSO, MFA, encryption) not clearly documented",
                ),
            ],
            Self::Interoperability(f) => vec![
                (f.sso.as_slice(), "SSO/SAML support not clearly documented"),
                (f.apis.as_slice(), "Public API availability not clearly documented"),
                (
                    f.webhooks.as_slice(),
                    "Webhook or event support not clearly documented",
                ),
                (
                    f.integrations.as_slice(),
                    "Pre-built integrations not clearly documented",
                ),
            ],
            Self::Cost(f) => vec![
                (f.pricing.as_slice(), "Public pricing not clearly documented"),
                (
                    f.implementation_costs.as_slice(),
                    "Implementation costs not clearly documented",
                ),
                (
                    f.support_costs.as_slice(),
                    "Support plan costs not clearly documented",
                ),
            ],
            Self::Adoption(f) => vec![
                (
                    f.support_channels.as_slice(),
                    "Support channels not clearly documented",
                ),
                (f.onboarding.as_slice(), "Onboarding process not clearly documented"),
                (f.training.as_slice(), "Training resources not clearly documented"),
                (f.sla.as_slice(), "Support SLA not clearly documented"),
            ],
        }
    }

    /// Flatten into an ordered list of statements. Empty categories
    /// contribute a gap statement instead.
    pub fn to_findings(&self) -> Vec<String> {
        let mut findings = Vec::new();
        for (items, gap) in self.categories() {
            let mut any = false;
            for item in items {
                let item = item.trim();
                if !item.is_empty() {
                    findings.push(item.to_string());
                    any = true;
                }
            }
            if !any {
                findings.push(gap.to_string());
            }
        }
        findings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedScale {
    #[serde(default)]
    #[schemars(description = "Approximate number of users, as a number")]
    pub users: Option<serde_json::Value>,

    #[serde(default)]
    pub org_type: Option<String>,

    #[serde(default)]
    pub regions: Vec<String>,
}

/// Requirement profile as returned by the model, before clamping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedProfile {
    #[serde(default)]
    pub critical_requirements: Vec<String>,

    #[serde(default)]
    pub nice_to_haves: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Named standards or regulations, e.g. 'SOC 2 Type II', 'GDPR'")]
    pub compliance_expectations: Vec<String>,

    #[serde(default)]
    #[schemars(
        description = "Importance 0-5 keyed by compliance, interoperability, cost, adoption"
    )]
    pub dimension_importance: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    #[schemars(description = "Systems the product must integrate with, e.g. 'Okta', 'Slack'")]
    pub integration_targets: Vec<String>,

    #[serde(default)]
    pub scale_assumptions: ExtractedScale,
}

/// Narrative comparison written by the model. The recommended vendor is never
/// taken from here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedComparison {
    #[serde(default)]
    #[schemars(description = "Two or three sentence overview per vendor, keyed by vendor name")]
    pub per_vendor: BTreeMap<String, String>,

    #[serde(default)]
    #[schemars(
        description = "Cross-vendor comparison keyed by compliance, interoperability, cost, adoption"
    )]
    pub comparison: BTreeMap<String, String>,

    #[serde(default)]
    #[schemars(description = "One sentence justifying the pre-selected vendor")]
    pub short_reason: Option<String>,

    #[serde(default)]
    #[schemars(description = "A paragraph justifying the pre-selected vendor")]
    pub detailed_reason: Option<String>,
}
