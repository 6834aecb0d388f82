//! Requirement alignment by keyword matching
//!
//! A requirement is met when the combined findings and excerpt text mention
//! it, directly or through a known variation. Strategies run in order and
//! stop at the first match.

use std::collections::BTreeMap;

use crate::model::{AlignmentStatus, Source};

/// Known variations, keyed by the requirement with parentheses removed and
/// slashes turned into spaces
const REQUIREMENT_VARIATIONS: &[(&str, &[&str])] = &[
    (
        "soc 2 type ii",
        &[
            "soc2",
            "soc 2",
            "soc2 type",
            "soc type ii",
            "soc 2 type 2",
            "soc 2 (type ⅱ)",
        ],
    ),
    (
        "sso saml",
        &["sso", "saml", "saml 2.0", "single sign-on", "single sign on"],
    ),
    (
        "iso 27001",
        &["iso27001", "iso/iec 27001", "iso/iec27001", "iso 27001:2013", "iso 27001:2022"],
    ),
    ("gdpr", &["general data protection regulation", "eu gdpr"]),
    ("ccpa", &["california consumer privacy act", "cpra"]),
    ("hipaa", &["health insurance portability", "baa", "business associate agreement"]),
    (
        "mfa",
        &["multi-factor", "multifactor", "two-factor", "2fa", "two factor"],
    ),
    (
        "rbac",
        &[
            "role-based",
            "role based",
            "role based access",
            "role-based access control",
        ],
    ),
    (
        "dpa data processing agreement",
        &["dpa", "data processing agreement", "data processing addendum"],
    ),
    (
        "encryption at rest and in transit",
        &[
            "encryption",
            "encrypted",
            "tls",
            "ssl",
            "aes-256",
            "encryption at rest",
            "encryption in transit",
        ],
    ),
    (
        "audit logs",
        &["audit log", "audit logging", "audit trail", "audit trail logs"],
    ),
    ("scim", &["scim 2.0", "user provisioning", "automated provisioning"]),
];

/// Lowercase and canonicalize SOC 2 spellings
fn normalize_requirement(requirement: &str) -> String {
    requirement
        .to_lowercase()
        .replace("soc2", "soc 2")
        .replace("type ⅱ", "type ii")
        .replace("type 2", "type ii")
        .trim()
        .to_string()
}

/// Words longer than two characters
fn significant_words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .collect()
}

/// Match one requirement against already lowercased text
pub fn requirement_met(requirement: &str, text: &str) -> bool {
    let normalized = normalize_requirement(requirement);
    if normalized.is_empty() {
        return false;
    }

    // 1. Slash alternatives ("SSO/SAML")
    if normalized.contains('/') {
        let matched = normalized
            .split('/')
            .map(str::trim)
            .filter(|alt| alt.chars().count() > 2)
            .any(|alt| text.contains(alt));
        if matched {
            return true;
        }
    }

    // 2. Known variations
    let key = normalized
        .replace(['(', ')'], "")
        .replace('/', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if let Some((_, variations)) = REQUIREMENT_VARIATIONS.iter().find(|(k, _)| *k == key)
        && (text.contains(key.as_str()) || variations.iter().any(|v| text.contains(v)))
    {
        return true;
    }

    // 3. Multi-word phrases: enough of the significant words appear
    let phrase = key.replace('-', " ");
    let key_parts = significant_words(&phrase);
    if key_parts.len() >= 2 {
        let needed = key_parts.len().min(2);
        let found = key_parts.iter().filter(|w| text.contains(**w)).count();
        if found >= needed {
            return true;
        }
    }

    // 4. Loose fallback: any significant word
    significant_words(&key).iter().any(|w| text.contains(*w))
}

/// Align requirements against findings text
pub fn align(findings: &[String], requirements: &[String]) -> BTreeMap<String, AlignmentStatus> {
    let text = findings.join(" ").to_lowercase();
    requirements
        .iter()
        .filter(|r| !r.trim().is_empty())
        .map(|r| {
            let status = if requirement_met(r, &text) {
                AlignmentStatus::Met
            } else {
                AlignmentStatus::Unmet
            };
            (r.clone(), status)
        })
        .collect()
}

/// Align requirements against findings plus source excerpts
pub fn align_with_sources(
    findings: &[String],
    sources: &[Source],
    requirements: &[String],
) -> BTreeMap<String, AlignmentStatus> {
    let evidence: Vec<String> = findings
        .iter()
        .cloned()
        .chain(sources.iter().map(|s| s.excerpt.clone()))
        .collect();
    align(&evidence, requirements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn met(requirement: &str, findings: &[&str]) -> bool {
        let findings: Vec<String> = findings.iter().map(|s| s.to_string()).collect();
        align_with_sources(&findings, &[], &[requirement.to_string()])[requirement] == AlignmentStatus::Met
    }

    #[test]
    fn test_soc2_variants() {
        assert!(met("SOC 2 Type II", &["SOC2 Type 2 certified since 2023"]));
        assert!(met("SOC 2 Type II", &["soc2 type ii certified"]));
        assert!(met("SOC 2 Type II", &["SOC 2 (Type Ⅱ) certification"]));
        assert!(met("soc2 type 2", &["Audited under SOC 2"]));
    }

    #[test]
    fn test_slash_alternatives() {
        assert!(met("SSO/SAML", &["Supports SAML 2.0 login"]));
        assert!(met("SSO/SAML", &["SSO via Okta"]));
        assert!(met("SSO/SAML", &["Single sign-on available"]));
    }

    #[test]
    fn test_synonyms() {
        assert!(met("ISO 27001", &["ISO/IEC 27001 certified"]));
        assert!(met("GDPR", &["Complies with the General Data Protection Regulation"]));
        assert!(met("MFA", &["Two-factor authentication for all users"]));
        assert!(met("RBAC", &["Role-based access control"]));
        assert!(met("DPA (Data Processing Agreement)", &["A DPA is available"]));
        assert!(met("Encryption at rest and in transit", &["AES-256 at rest, TLS 1.2"]));
        assert!(met("Audit logs", &["Full audit trail of admin actions"]));
    }

    #[test]
    fn test_phrase_and_loose_matching() {
        assert!(met("Data residency in EU", &["Customers choose EU data residency"]));
        assert!(met("Salesforce integration", &["Native Salesforce connector"]));
        assert!(met("Single sign-on (SSO)", &["sso via okta"]));
        assert!(met("Data residency (EU region)", &["Hosted in the EU region with data residency"]));
        assert!(met("Webhooks (outbound)", &["Outbound webhooks for every event"]));
        assert!(met("Export (CSV/JSON)", &["Reports download as JSON"]));
    }

    #[test]
    fn test_align_findings_only() {
        let alignment = align(
            &["SAML 2.0 single sign-on".to_string()],
            &["SSO/SAML".to_string(), "HIPAA".to_string()],
        );
        assert_eq!(alignment["SSO/SAML"], AlignmentStatus::Met);
        assert_eq!(alignment["HIPAA"], AlignmentStatus::Unmet);
    }

    #[test]
    fn test_unmet() {
        assert!(!met("HIPAA", &["SOC 2 certified", "GDPR compliant"]));
        assert!(!met("SSO/SAML", &["Password login only"]));
        assert!(!met("MFA", &[]));
        // Two-letter words are too short to count on their own
        assert!(!met("Residency (EU)", &["eu hosting only"]));
    }

    #[test]
    fn test_excerpts_count_as_evidence() {
        use crate::model::{Credibility, Source};
        let source = Source {
            url: "https://acme.com/trust".into(),
            title: "Trust".into(),
            excerpt: "Acme signs a Business Associate Agreement on request.".into(),
            credibility: Credibility::Official,
            accessed_at: chrono::Utc::now(),
            query: "hipaa".into(),
        };

        let alignment = align_with_sources(&[], &[source], &["HIPAA".to_string()]);
        assert_eq!(alignment["HIPAA"], AlignmentStatus::Met);
    }

    #[test]
    fn test_blank_requirements_ignored() {
        let alignment = align_with_sources(&["anything".to_string()], &[], &["  ".to_string()]);
        assert!(alignment.is_empty());
    }
}
