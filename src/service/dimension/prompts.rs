//! Prompts and search topics for dimension evaluation

use crate::model::{Dimension, RequirementProfile, Source};

/// Search topic per dimension
pub fn topic_query(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Compliance => {
            "SOC2 ISO27001 security certifications GDPR CCPA HIPAA privacy data retention \
             SSO SAML encryption audit logs RBAC MFA"
        }
        Dimension::Interoperability => {
            "REST API SSO SAML integrations webhooks developer documentation"
        }
        Dimension::Cost => {
            "pricing plans cost per user enterprise pricing implementation fees support plans"
        }
        Dimension::Adoption => {
            "customer support SLA onboarding training documentation implementation timeline"
        }
    }
}

/// System prompt for findings extraction
pub fn system_prompt(dimension: Dimension) -> String {
    let focus = match dimension {
        Dimension::Compliance => {
            "security certifications, privacy regulations, data handling practices and \
             security features"
        }
        Dimension::Interoperability => {
            "single sign-on, public APIs, webhooks and pre-built integrations"
        }
        Dimension::Cost => {
            "published pricing, plan tiers, implementation fees and support plan costs"
        }
        Dimension::Adoption => {
            "support channels, onboarding programmes, training resources and support SLAs"
        }
    };

    format!(
        r#"You are an enterprise procurement analyst reviewing a software vendor.

Extract factual findings about {focus} from the provided sources.

You must:
- Use only what the sources state
- Write each finding as one short sentence naming the fact
- State explicitly when something is not documented (e.g. "HIPAA compliance not documented")

Do not:
- Invent certifications, prices or integrations
- Repeat marketing language without a concrete fact"#
    )
}

/// User prompt with the vendor, the relevant requirements and the sources
pub fn build_findings_prompt(
    vendor_name: &str,
    dimension: Dimension,
    requirements: &[String],
    profile: &RequirementProfile,
    sources: &[Source],
) -> String {
    let mut prompt = format!(
        "Vendor: {}\nDimension: {}\n",
        vendor_name,
        dimension.as_str()
    );

    if !requirements.is_empty() {
        prompt.push_str(&format!("Requirements to check: {}\n", requirements.join(", ")));
    }

    if let Some(users) = profile.scale_assumptions.users {
        prompt.push_str(&format!("Expected users: {}\n", users));
    }

    prompt.push_str("\n## Sources\n\n");
    for (i, source) in sources.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. [{}] {}\n   URL: {}\n   Excerpt: {}\n\n",
            i + 1,
            source.credibility.as_str(),
            source.title,
            source.url,
            source.excerpt
        ));
    }

    prompt
}
