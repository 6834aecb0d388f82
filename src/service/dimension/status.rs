//! Status, score and confidence for one dimension
//!
//! Pure functions over findings and sources.

use crate::model::evidence::official_count;
use crate::model::{Confidence, Source, Verdict};

const NEGATIVE_WORDS: &[&str] = &["not", "unable", "unclear", "unavailable", "no"];
const POSITIVE_WORDS: &[&str] = &["certified", "compliant", "supports", "provides", "available"];

/// Score assigned when negative findings dominate
pub const RISK_SCORE: f64 = 1.5;
const OK_SCORE_FLOOR: f64 = 2.0;
const OK_SCORE_CEILING: f64 = 5.0;
const REQUIREMENTS_BONUS: f64 = 0.5;
const REQUIREMENTS_BONUS_MIN_MET: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

/// Classify a finding by whole-word keywords. Negation wins.
pub fn polarity(finding: &str) -> Polarity {
    let lower = finding.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if words.iter().any(|w| NEGATIVE_WORDS.contains(w)) {
        Polarity::Negative
    } else if words.iter().any(|w| POSITIVE_WORDS.contains(w)) {
        Polarity::Positive
    } else {
        Polarity::Neutral
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolarityCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl PolarityCounts {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

pub fn count_polarity(findings: &[String]) -> PolarityCounts {
    findings
        .iter()
        .fold(PolarityCounts::default(), |mut counts, f| {
            match polarity(f) {
                Polarity::Positive => counts.positive += 1,
                Polarity::Negative => counts.negative += 1,
                Polarity::Neutral => counts.neutral += 1,
            }
            counts
        })
}

/// Decide the verdict. Rules are applied in order:
/// 1. no sources or no official source: insufficient data
/// 2. more negative than positive findings: risk
/// 3. at least one positive finding: ok, scored in [2.0, 5.0]
/// 4. otherwise insufficient data
pub fn determine_status(findings: &[String], sources: &[Source], met_requirements: usize) -> Verdict {
    if sources.is_empty() || official_count(sources) == 0 {
        return Verdict::insufficient();
    }

    let counts = count_polarity(findings);

    if counts.negative > counts.positive {
        return Verdict::risk(RISK_SCORE);
    }

    if counts.positive >= 1 {
        let ratio = (counts.positive as f64 - 0.5 * counts.negative as f64)
            / counts.total().max(1) as f64;
        let mut score = OK_SCORE_FLOOR + (OK_SCORE_CEILING - OK_SCORE_FLOOR) * ratio.max(0.0);
        if met_requirements >= REQUIREMENTS_BONUS_MIN_MET {
            score += REQUIREMENTS_BONUS;
        }
        let score = score.clamp(OK_SCORE_FLOOR, OK_SCORE_CEILING);
        return Verdict::ok((score * 10.0).round() / 10.0);
    }

    Verdict::insufficient()
}

/// Confidence from source counts alone
pub fn confidence_for(sources: &[Source]) -> Confidence {
    let official = official_count(sources);
    if sources.is_empty() || official == 0 {
        Confidence::Low
    } else if official >= 2 && sources.len() >= 3 {
        Confidence::High
    } else {
        Confidence::Medium
    }
}
