//! Deterministic narratives used when the model is unavailable or when no
//! vendor can be recommended

use crate::model::{Dimension, DimensionStatus, RankedVendor, VendorEvaluation};

fn score_text(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{:.2}/5", score),
        None => "unscored".to_string(),
    }
}

fn dimension_text(vendor: &VendorEvaluation, dimension: Dimension) -> String {
    match vendor.output(dimension) {
        Some(output) => match (output.status, output.score) {
            (DimensionStatus::InsufficientData, _) | (_, None) => {
                format!("{} {}", dimension.label(), output.status.label())
            }
            (status, Some(score)) => {
                format!("{} {} ({:.1})", dimension.label(), status.label(), score)
            }
        },
        None => format!("{} not evaluated", dimension.label()),
    }
}

/// One paragraph per vendor: overall score and per-dimension status
pub fn vendor_overview(vendor: &VendorEvaluation) -> String {
    let scored = vendor
        .dimension_outputs
        .values()
        .filter(|o| o.is_scored())
        .count();
    let dimensions: Vec<String> = Dimension::ALL
        .iter()
        .map(|d| dimension_text(vendor, *d))
        .collect();

    let headline = match vendor.total_score {
        Some(score) => format!(
            "{} scores {} overall across {} scored dimension(s), backed by {} official source(s).",
            vendor.name,
            score_text(Some(score)),
            scored,
            vendor.official_sources()
        ),
        None => format!(
            "{} could not be scored: no dimension had enough verifiable evidence.",
            vendor.name
        ),
    };

    format!("{} {}.", headline, dimensions.join("; "))
}

/// How the vendors compare on one dimension
pub fn dimension_comparison(dimension: Dimension, vendors: &[VendorEvaluation]) -> String {
    let entries: Vec<String> = vendors
        .iter()
        .map(|v| match v.output(dimension) {
            Some(o) if o.is_scored() => format!(
                "{} {} ({:.1})",
                v.name,
                o.status.label(),
                o.score.unwrap_or_default()
            ),
            Some(o) => format!("{} {}", v.name, o.status.label()),
            None => format!("{} not evaluated", v.name),
        })
        .collect();

    format!("{}: {}.", dimension.label(), entries.join(", "))
}

pub fn recommended_short(vendor: &VendorEvaluation) -> String {
    format!(
        "{} ranks first with an overall score of {}, based on {} official source(s).",
        vendor.name,
        score_text(vendor.total_score),
        vendor.official_sources()
    )
}

pub fn recommended_detail(vendor: &VendorEvaluation, ranking: &[RankedVendor]) -> String {
    let mut detail = recommended_short(vendor);

    if let Some(runner_up) = ranking.iter().find(|r| r.vendor_id != vendor.id) {
        detail.push_str(&format!(
            " The next best option, {}, scores {}.",
            runner_up.vendor_name,
            score_text(runner_up.total_score)
        ));
    }

    if let Some(compliance) = vendor.output(Dimension::Compliance) {
        detail.push_str(&format!(
            " {} is rated {} with {} confidence.",
            Dimension::Compliance.label(),
            compliance.status.label(),
            compliance.confidence.as_str()
        ));
    }

    let unmet: Vec<&str> = vendor
        .dimension_outputs
        .values()
        .flat_map(|o| o.unmet_requirements.iter().map(String::as_str))
        .collect();
    if !unmet.is_empty() {
        detail.push_str(&format!(
            " Before contracting, confirm these unverified requirements: {}.",
            unmet.join(", ")
        ));
    }

    detail
}

pub fn refusal_short(reason: &str) -> String {
    format!("No vendor can be safely recommended. {}", reason)
}

pub fn refusal_detail(reason: &str, vendors: &[VendorEvaluation]) -> String {
    let names: Vec<&str> = vendors.iter().map(|v| v.name.as_str()).collect();
    format!(
        "Unable to recommend any of the evaluated vendors ({}). {} \
         Request the security and compliance documentation (SOC 2 report, ISO 27001 \
         certificate, DPA) from each vendor and re-run the evaluation.",
        names.join(", "),
        reason
    )
}
