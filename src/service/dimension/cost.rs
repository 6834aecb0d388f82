//! Total cost of ownership estimate from pricing findings

use std::sync::LazyLock;

use regex::Regex;

use crate::model::TcoEstimate;
use crate::model::findings::PricingFindings;

/// Assumed seat count when the use case gives none
pub const DEFAULT_USER_COUNT: u32 = 300;
/// Industry default when no per-user price is published
const DEFAULT_PER_USER_MONTHLY: f64 = 100.0;
/// Implementation cost as a share of first-year licenses
const IMPLEMENTATION_FACTOR: f64 = 0.2;

static PRICE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\s?(\d+(?:\.\d+)?)(?:\s*[-–]\s*\$?\s?(\d+(?:\.\d+)?))?\s*(?:per user|/\s?user|per seat|/\s?seat|per month|/\s?mo)")
        .ok()
});

/// Per-user monthly price mentioned in the text; ranges use their midpoint
pub fn extract_per_user_price(text: &str) -> Option<f64> {
    let caps = PRICE_PATTERN.as_ref()?.captures(text)?;
    let low: f64 = caps.get(1)?.as_str().parse().ok()?;
    let price = match caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok()) {
        Some(high) => (low + high) / 2.0,
        None => low,
    };
    (price > 0.0).then_some(price)
}

/// Pricing model from the model's answer, else from wording
pub fn detect_pricing_model(findings: &PricingFindings) -> String {
    const KNOWN: &[&str] = &["per_user", "tiered", "custom_quote", "usage_based"];

    if let Some(model) = &findings.pricing_model {
        let model = model.trim().to_lowercase().replace([' ', '-'], "_");
        if KNOWN.contains(&model.as_str()) {
            return model;
        }
    }

    let text = findings.pricing.join(" ").to_lowercase();
    if text.contains("per user") || text.contains("per seat") || text.contains("/user") {
        "per_user".to_string()
    } else if text.contains("tier") {
        "tiered".to_string()
    } else if text.contains("custom") || text.contains("quote") || text.contains("contact sales") {
        "custom_quote".to_string()
    } else if text.contains("usage") || text.contains("consumption") {
        "usage_based".to_string()
    } else {
        "undetermined".to_string()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Year one is licenses plus implementation; later years are licenses only
pub fn estimate_tco(findings: &PricingFindings, users: Option<u32>) -> TcoEstimate {
    let users = users.filter(|u| *u > 0).unwrap_or(DEFAULT_USER_COUNT);

    let priced_text = findings
        .pricing
        .iter()
        .chain(findings.support_costs.iter())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    let found_price = extract_per_user_price(&priced_text);
    let per_user_monthly = found_price.unwrap_or(DEFAULT_PER_USER_MONTHLY);

    let annual = users as f64 * per_user_monthly * 12.0;
    let year1 = annual * (1.0 + IMPLEMENTATION_FACTOR);

    TcoEstimate {
        users,
        per_user_monthly: round2(per_user_monthly),
        price_assumed: found_price.is_none(),
        year1_total: round2(year1),
        annual_ongoing: round2(annual),
        three_year_total: round2(year1 + 2.0 * annual),
        pricing_model: detect_pricing_model(findings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_price_variants() {
        assert_eq!(extract_per_user_price("Pro plan is $12 per user per month"), Some(12.0));
        assert_eq!(extract_per_user_price("$10-$14/user"), Some(12.0));
        assert_eq!(extract_per_user_price("$8.75 per seat"), Some(8.75));
        assert_eq!(extract_per_user_price("Contact sales for pricing"), None);
    }

    #[test]
    fn test_estimate_with_published_price() {
        let findings = PricingFindings {
            pricing: vec!["Business plan provides $10 per user per month".to_string()],
            ..Default::default()
        };

        let tco = estimate_tco(&findings, Some(100));
        assert!(!tco.price_assumed);
        assert_eq!(tco.annual_ongoing, 12_000.0);
        assert_eq!(tco.year1_total, 14_400.0);
        assert_eq!(tco.three_year_total, 38_400.0);
        assert_eq!(tco.pricing_model, "per_user");
    }

    #[test]
    fn test_estimate_defaults() {
        let tco = estimate_tco(&PricingFindings::default(), None);
        assert!(tco.price_assumed);
        assert_eq!(tco.users, DEFAULT_USER_COUNT);
        assert_eq!(tco.per_user_monthly, 100.0);
        assert_eq!(tco.annual_ongoing, 360_000.0);
        assert_eq!(tco.pricing_model, "undetermined");
    }

    #[test]
    fn test_pricing_model_from_answer() {
        let findings = PricingFindings {
            pricing_model: Some("Custom Quote".to_string()),
            ..Default::default()
        };
        assert_eq!(detect_pricing_model(&findings), "custom_quote");
    }
}
