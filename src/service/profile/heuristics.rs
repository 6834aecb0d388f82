//! Keyword heuristics over the free-text use case
//!
//! Used when the model is unavailable and to fill lists it leaves out.
//! Dimension weights are never inferred here; they stay at the default.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{RequirementProfile, ScaleAssumptions};

/// Keyword spellings and the integration target they name
const INTEGRATION_TARGETS: &[(&[&str], &str)] = &[
    (&["okta"], "Okta"),
    (&["slack"], "Slack"),
    (&["jira"], "Jira"),
    (&["snowflake"], "Snowflake"),
    (&["office 365", "o365", "microsoft 365", "m365"], "Office 365"),
    (&["salesforce"], "Salesforce"),
    (&["servicenow", "service now"], "ServiceNow"),
    (&["workday"], "Workday"),
    (&["sso", "single sign-on", "single sign on"], "SSO"),
    (&["webhook", "webhooks"], "Webhooks"),
    (&["api", "apis", "rest api"], "API"),
];

/// Standards named in the use case
const COMPLIANCE_STANDARDS: &[(&[&str], &str)] = &[
    (&["soc 2", "soc2"], "SOC 2 Type II"),
    (&["iso 27001", "iso27001"], "ISO 27001"),
    (&["gdpr"], "GDPR"),
    (&["hipaa"], "HIPAA"),
    (&["ccpa"], "CCPA"),
];

static USER_RANGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d,]*)\s*(?:-|–|to)\s*(\d[\d,]*)\s*(?:users|employees|seats|people|staff)")
        .ok()
});
static USER_COUNT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d,]*)\s*\+?\s*(?:users|employees|seats|people|staff)").ok()
});

/// Lowercase words padded with spaces, so phrases match on word boundaries
fn word_text(text: &str) -> String {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    format!(" {} ", words.join(" "))
}

fn mentions(words: &str, keyword: &str) -> bool {
    let keyword = word_text(keyword);
    !keyword.trim().is_empty() && words.contains(keyword.as_str())
}

fn mentions_any(words: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| mentions(words, k))
}

fn detect_from_table(use_case: &str, table: &[(&[&str], &str)]) -> Vec<String> {
    let words = word_text(use_case);
    table
        .iter()
        .filter(|(keywords, _)| mentions_any(&words, keywords))
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Integration targets named in the use case, in table order
pub fn detect_integration_targets(use_case: &str) -> Vec<String> {
    detect_from_table(use_case, INTEGRATION_TARGETS)
}

pub fn detect_compliance_expectations(use_case: &str) -> Vec<String> {
    detect_from_table(use_case, COMPLIANCE_STANDARDS)
}

fn parse_count(raw: &str) -> Option<u32> {
    raw.replace(',', "").parse().ok()
}

/// User count from "200-500 users" (midpoint) or "300 users"
pub fn extract_user_count(use_case: &str) -> Option<u32> {
    if let Some(caps) = USER_RANGE.as_ref().and_then(|re| re.captures(use_case)) {
        let low = caps.get(1).and_then(|m| parse_count(m.as_str()));
        let high = caps.get(2).and_then(|m| parse_count(m.as_str()));
        if let (Some(low), Some(high)) = (low, high) {
            return Some((low + high) / 2);
        }
    }

    USER_COUNT
        .as_ref()
        .and_then(|re| re.captures(use_case))
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_count(m.as_str()))
        .filter(|n| *n > 0)
}

/// Profile built from keywords alone
pub fn heuristic_profile(use_case: &str) -> RequirementProfile {
    RequirementProfile {
        compliance_expectations: detect_compliance_expectations(use_case),
        integration_targets: detect_integration_targets(use_case),
        scale_assumptions: ScaleAssumptions {
            users: extract_user_count(use_case),
            ..Default::default()
        },
        ..Default::default()
    }
}
