//! Prompts for the cross-vendor comparison narrative

use crate::model::{Dimension, RequirementProfile, VendorEvaluation};

/// Findings quoted per vendor and dimension
const FINDINGS_PER_DIMENSION: usize = 3;

pub const SYSTEM_PROMPT: &str = r#"You are an enterprise procurement analyst writing a vendor comparison.

The recommended vendor has already been selected from the scores. Explain the choice; do not change it.

You must:
- Base every statement on the scores and findings provided
- Mention dimensions with insufficient data as gaps, not as weaknesses
- Key per_vendor by the vendor name exactly as given

Do not:
- Recommend a different vendor
- Invent certifications, prices or integrations"#;

pub fn build_comparison_prompt(
    use_case: &str,
    profile: &RequirementProfile,
    vendors: &[VendorEvaluation],
    selected: &VendorEvaluation,
) -> String {
    let mut prompt = String::new();

    if !use_case.trim().is_empty() {
        prompt.push_str(&format!("## Use case\n\n{}\n\n", use_case.trim()));
    }

    prompt.push_str("## Importance (0-5)\n\n");
    for dimension in Dimension::ALL {
        prompt.push_str(&format!(
            "- {}: {}\n",
            dimension,
            profile.dimension_importance.get(dimension)
        ));
    }

    prompt.push_str("\n## Vendors\n");
    for vendor in vendors {
        let total = vendor
            .total_score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "unscored".to_string());
        prompt.push_str(&format!("\n### {} (overall {})\n", vendor.name, total));

        for (dimension, output) in &vendor.dimension_outputs {
            let score = output
                .score
                .map(|s| format!(" {:.1}", s))
                .unwrap_or_default();
            prompt.push_str(&format!(
                "- {}: {}{}, {} confidence\n",
                dimension,
                output.status.label(),
                score,
                output.confidence.as_str()
            ));
            for finding in output.findings.iter().take(FINDINGS_PER_DIMENSION) {
                prompt.push_str(&format!("  - {}\n", finding));
            }
        }
    }

    prompt.push_str(&format!("\n## Selected vendor\n\n{}\n", selected.name));
    prompt
}
