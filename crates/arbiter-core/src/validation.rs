//! Statistical validation of machine verdicts against human annotations.
//!
//! Measures how well the pipeline's verdicts track human judgment:
//! Kendall's tau rank correlation over the shared pass/review/fail scale,
//! a raw agreement rate, and a 3x3 confusion matrix, gated against a
//! configurable tau threshold.
//!
//! The tau computed here is tau-a restricted to non-tied pairs: tied pairs
//! are excluded from both the concordant and discordant counts, and no
//! tie-correction denominator is applied.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Rank positions for the closed label set: pass=2, review=1, fail=0.
const LABELS: [&str; 3] = ["pass", "review", "fail"];

/// Errors from the validation subsystem. Always explicit: invalid input
/// is never coerced into a best-effort statistic.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("need at least 2 annotation pairs to compute correlation, got {0}")]
    NotEnoughPairs(usize),

    #[error("invalid human annotation: {0:?}")]
    InvalidHumanAnnotation(String),

    #[error("invalid machine verdict: {0:?}")]
    InvalidMachineVerdict(String),

    #[error("no annotation pairs to validate")]
    Empty,
}

/// A human annotation paired with the machine verdict for one event.
///
/// Both labels are free-form strings at this level; anything outside the
/// pass/review/fail set fails validation with a named error rather than
/// being silently mapped to a rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPair {
    pub event_id: String,
    pub human_annotation: String,
    pub llm_verdict: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Outcome of a full validation run. Entirely derived from the input
/// pairs; never updated incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub total_records: usize,
    pub agreement_count: usize,
    pub agreement_rate: f64,
    pub kendall_tau: f64,
    pub threshold: f64,
    pub passed: bool,
    pub confusion_matrix: BTreeMap<String, u64>,
    pub interpretation: String,
}

fn label_rank(label: &str) -> Option<i8> {
    match label {
        "pass" => Some(2),
        "review" => Some(1),
        "fail" => Some(0),
        _ => None,
    }
}

/// Kendall's tau between the human and machine label sequences.
///
/// Requires at least two pairs. For every unordered pair of records the
/// sign of the human rank difference is compared against the sign of the
/// machine rank difference: same non-zero sign counts as concordant,
/// opposite non-zero signs as discordant, and a zero difference on either
/// side excludes the pair from both counts. The denominator is always
/// C(n, 2).
pub fn compute_kendall_tau(pairs: &[AnnotationPair]) -> Result<f64, ValidationError> {
    if pairs.len() < 2 {
        return Err(ValidationError::NotEnoughPairs(pairs.len()));
    }

    let mut human_ranks = Vec::with_capacity(pairs.len());
    let mut machine_ranks = Vec::with_capacity(pairs.len());
    for pair in pairs {
        human_ranks.push(
            label_rank(&pair.human_annotation)
                .ok_or_else(|| ValidationError::InvalidHumanAnnotation(pair.human_annotation.clone()))?,
        );
        machine_ranks.push(
            label_rank(&pair.llm_verdict)
                .ok_or_else(|| ValidationError::InvalidMachineVerdict(pair.llm_verdict.clone()))?,
        );
    }

    let mut concordant: i64 = 0;
    let mut discordant: i64 = 0;
    for i in 0..pairs.len() {
        for j in (i + 1)..pairs.len() {
            let human_diff = i32::from(human_ranks[i] - human_ranks[j]);
            let machine_diff = i32::from(machine_ranks[i] - machine_ranks[j]);
            let product = human_diff * machine_diff;
            if product > 0 {
                concordant += 1;
            } else if product < 0 {
                discordant += 1;
            }
            // Either diff zero: tied pair, counted in neither bucket.
        }
    }

    let total_pairs = (pairs.len() * (pairs.len() - 1) / 2) as i64;
    Ok((concordant - discordant) as f64 / total_pairs as f64)
}

/// 3x3 confusion matrix keyed `"<human>_<machine>"`.
///
/// All nine cells are initialized to zero before counting, so absent
/// combinations report 0 rather than a missing key. Pairs with labels
/// outside the closed set are not counted; [`validate_annotations`]
/// rejects such input before this runs.
pub fn confusion_matrix(pairs: &[AnnotationPair]) -> BTreeMap<String, u64> {
    let mut matrix = BTreeMap::new();
    for human in LABELS {
        for machine in LABELS {
            matrix.insert(format!("{human}_{machine}"), 0);
        }
    }

    for pair in pairs {
        let key = format!("{}_{}", pair.human_annotation, pair.llm_verdict);
        if let Some(count) = matrix.get_mut(&key) {
            *count += 1;
        }
    }

    matrix
}

/// Full validation analysis: tau, agreement rate, confusion matrix, and
/// the `tau >= threshold` gate.
pub fn validate_annotations(
    pairs: &[AnnotationPair],
    threshold: f64,
) -> Result<ValidationResult, ValidationError> {
    if pairs.is_empty() {
        return Err(ValidationError::Empty);
    }

    let tau = compute_kendall_tau(pairs)?;

    // Raw agreement is exact label equality, independent of rank distance.
    let agreement_count = pairs
        .iter()
        .filter(|pair| pair.human_annotation == pair.llm_verdict)
        .count();

    tracing::debug!(
        total = pairs.len(),
        agreement = agreement_count,
        tau,
        "annotation validation computed"
    );

    Ok(ValidationResult {
        total_records: pairs.len(),
        agreement_count,
        agreement_rate: agreement_count as f64 / pairs.len() as f64,
        kendall_tau: tau,
        threshold,
        passed: tau >= threshold,
        confusion_matrix: confusion_matrix(pairs),
        interpretation: interpret_tau(tau).to_string(),
    })
}

/// Categorical reading of a tau value, banded on magnitude: a strongly
/// negative correlation reports the same band as a strongly positive one.
pub fn interpret_tau(tau: f64) -> &'static str {
    let magnitude = tau.abs();
    if magnitude >= 0.7 {
        "Strong agreement"
    } else if magnitude >= 0.5 {
        "Moderate to strong agreement"
    } else if magnitude >= 0.3 {
        "Moderate agreement"
    } else if magnitude >= 0.1 {
        "Weak agreement"
    } else {
        "Very weak or no agreement"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pair(human: &str, machine: &str) -> AnnotationPair {
        AnnotationPair {
            event_id: format!("evt-{human}-{machine}"),
            human_annotation: human.to_string(),
            llm_verdict: machine.to_string(),
            confidence: 0.5,
        }
    }

    fn pairs_from(labels: &[(&str, &str)]) -> Vec<AnnotationPair> {
        labels.iter().map(|(h, m)| pair(h, m)).collect()
    }

    #[test]
    fn fewer_than_two_pairs_is_an_error() {
        assert_eq!(
            compute_kendall_tau(&[]),
            Err(ValidationError::NotEnoughPairs(0))
        );
        assert_eq!(
            compute_kendall_tau(&[pair("pass", "pass")]),
            Err(ValidationError::NotEnoughPairs(1))
        );
    }

    #[test]
    fn invalid_human_label_is_a_named_error() {
        let pairs = pairs_from(&[("excellent", "pass"), ("fail", "fail")]);
        assert_eq!(
            compute_kendall_tau(&pairs),
            Err(ValidationError::InvalidHumanAnnotation("excellent".to_string()))
        );
    }

    #[test]
    fn invalid_machine_label_is_a_named_error() {
        let pairs = pairs_from(&[("pass", "pass"), ("fail", "unevaluated")]);
        assert_eq!(
            compute_kendall_tau(&pairs),
            Err(ValidationError::InvalidMachineVerdict("unevaluated".to_string()))
        );
    }

    #[test]
    fn perfect_disagreement_on_distinct_ranks_is_minus_one() {
        let pairs = pairs_from(&[("pass", "fail"), ("review", "review"), ("fail", "pass")]);
        let tau = compute_kendall_tau(&pairs).unwrap();
        assert!((tau - (-1.0)).abs() < 1e-9);
        assert!(tau <= -0.5);
    }

    #[test]
    fn identical_sequences_with_ties_stay_strong() {
        // The worked example: 5 matching annotations in rank order.
        let pairs = pairs_from(&[
            ("pass", "pass"),
            ("pass", "pass"),
            ("review", "review"),
            ("fail", "fail"),
            ("fail", "fail"),
        ]);

        // 8 of C(5,2)=10 pairs are concordant, 2 are ties: tau = 0.8.
        let tau = compute_kendall_tau(&pairs).unwrap();
        assert!((tau - 0.8).abs() < 1e-9);
        assert!(tau >= 0.7);

        let result = validate_annotations(&pairs, 0.3).unwrap();
        assert!(result.passed);
        assert_eq!(result.agreement_count, 5);
        assert_eq!(result.agreement_rate, 1.0);
        assert_eq!(result.interpretation, "Strong agreement");
    }

    #[test]
    fn ties_dilute_tau_below_one() {
        // All-identical labels: every pair is a tie, tau is exactly 0.
        let pairs = pairs_from(&[("pass", "pass"), ("pass", "pass"), ("pass", "pass")]);
        let tau = compute_kendall_tau(&pairs).unwrap();
        assert_eq!(tau, 0.0);
    }

    #[test]
    fn confusion_matrix_always_has_nine_zero_initialized_cells() {
        let matrix = confusion_matrix(&[]);
        assert_eq!(matrix.len(), 9);
        assert!(matrix.values().all(|&count| count == 0));

        let pairs = pairs_from(&[("pass", "review"), ("pass", "review"), ("fail", "fail")]);
        let matrix = confusion_matrix(&pairs);
        assert_eq!(matrix.len(), 9);
        assert_eq!(matrix["pass_review"], 2);
        assert_eq!(matrix["fail_fail"], 1);
        assert_eq!(matrix["pass_pass"], 0);
        assert_eq!(matrix.values().sum::<u64>(), pairs.len() as u64);
    }

    #[test]
    fn validate_empty_input_is_an_error() {
        assert_eq!(validate_annotations(&[], 0.3), Err(ValidationError::Empty));
    }

    #[test]
    fn validate_propagates_label_errors() {
        let pairs = pairs_from(&[("pass", "pass"), ("maybe", "fail")]);
        assert_eq!(
            validate_annotations(&pairs, 0.3),
            Err(ValidationError::InvalidHumanAnnotation("maybe".to_string()))
        );
    }

    #[test]
    fn gate_fails_below_threshold() {
        let pairs = pairs_from(&[("pass", "fail"), ("review", "review"), ("fail", "pass")]);
        let result = validate_annotations(&pairs, 0.3).unwrap();
        assert!(!result.passed);
        assert_eq!(result.agreement_count, 1);
        // Strong *negative* correlation still reports the strong band.
        assert_eq!(result.interpretation, "Strong agreement");
    }

    #[test]
    fn interpretation_bands() {
        assert_eq!(interpret_tau(0.75), "Strong agreement");
        assert_eq!(interpret_tau(-0.75), "Strong agreement");
        assert_eq!(interpret_tau(0.6), "Moderate to strong agreement");
        assert_eq!(interpret_tau(0.35), "Moderate agreement");
        assert_eq!(interpret_tau(0.15), "Weak agreement");
        assert_eq!(interpret_tau(0.05), "Very weak or no agreement");
        assert_eq!(interpret_tau(0.0), "Very weak or no agreement");
    }

    #[test]
    fn result_serializes_with_report_field_names() {
        let pairs = pairs_from(&[("pass", "pass"), ("fail", "fail")]);
        let result = validate_annotations(&pairs, 0.5).unwrap();
        let json: serde_json::Value = serde_json::to_value(&result).unwrap();

        assert_eq!(json["total_records"], 2);
        assert_eq!(json["agreement_count"], 2);
        assert_eq!(json["kendall_tau"], 1.0);
        assert_eq!(json["passed"], true);
        assert_eq!(json["confusion_matrix"]["pass_pass"], 1);
        assert!(json["interpretation"].is_string());
    }

    fn label_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["pass", "review", "fail"])
    }

    proptest! {
        #[test]
        fn tau_is_symmetric_under_series_swap(
            labels in prop::collection::vec((label_strategy(), label_strategy()), 2..30)
        ) {
            let pairs: Vec<AnnotationPair> =
                labels.iter().map(|(h, m)| pair(h, m)).collect();
            let swapped: Vec<AnnotationPair> =
                labels.iter().map(|(h, m)| pair(m, h)).collect();

            let tau = compute_kendall_tau(&pairs).unwrap();
            let tau_swapped = compute_kendall_tau(&swapped).unwrap();
            prop_assert!((tau - tau_swapped).abs() < 1e-12);
        }

        #[test]
        fn tau_is_bounded(
            labels in prop::collection::vec((label_strategy(), label_strategy()), 2..30)
        ) {
            let pairs: Vec<AnnotationPair> =
                labels.iter().map(|(h, m)| pair(h, m)).collect();
            let tau = compute_kendall_tau(&pairs).unwrap();
            prop_assert!((-1.0..=1.0).contains(&tau));
        }

        #[test]
        fn matrix_counts_sum_to_input_length(
            labels in prop::collection::vec((label_strategy(), label_strategy()), 0..30)
        ) {
            let pairs: Vec<AnnotationPair> =
                labels.iter().map(|(h, m)| pair(h, m)).collect();
            let matrix = confusion_matrix(&pairs);
            prop_assert_eq!(matrix.len(), 9);
            prop_assert_eq!(matrix.values().sum::<u64>(), pairs.len() as u64);
        }
    }
}
