//! False-accept and false-reject rates from open-set decisions.

use serde::{Deserialize, Serialize};

use super::{ProbeResult, guarded_ratio};

/// Confusion counts of the engine's binary mate decisions.
///
/// Each probe is classified by whether its rank-1 candidate is the true
/// subject and whether the engine claimed a mate:
///
/// | decision | rank-1 matches | class |
/// |----------|----------------|-------|
/// | true     | yes            | TP    |
/// | true     | no             | FP    |
/// | false    | yes            | FN    |
/// | false    | no             | TN    |
///
/// A probe with an empty candidate list has no matching rank-1 candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionCounts {
    /// Mate claimed, rank-1 correct.
    pub true_positive: usize,
    /// Mate claimed, rank-1 wrong.
    pub false_positive: usize,
    /// Mate denied, rank-1 would have been correct.
    pub false_negative: usize,
    /// Mate denied, rank-1 wrong.
    pub true_negative: usize,
}

impl DecisionCounts {
    /// Classify every probe.
    #[must_use]
    pub fn classify(results: &[ProbeResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            let hit = result.rank_one().is_some_and(|c| c.matches(result.truth));
            match (result.decision, hit) {
                (true, true) => counts.true_positive += 1,
                (true, false) => counts.false_positive += 1,
                (false, true) => counts.false_negative += 1,
                (false, false) => counts.true_negative += 1,
            }
        }
        counts
    }

    /// Number of classified probes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    /// `FP / (FP + TP)`.
    #[must_use]
    pub fn far(&self) -> f64 {
        guarded_ratio(self.false_positive, self.false_positive + self.true_positive)
    }

    /// `FN / (FN + TN)`.
    #[must_use]
    pub fn frr(&self) -> f64 {
        guarded_ratio(self.false_negative, self.false_negative + self.true_negative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::fixtures::probe;

    #[test]
    fn test_perfect_engine() {
        let results = vec![probe(1, &[(1, 1.0)], true), probe(2, &[(2, 1.0)], true)];
        let counts = DecisionCounts::classify(&results);
        assert_eq!(counts.true_positive, 2);
        assert_eq!(counts.far(), 0.0);
        assert_eq!(counts.frr(), 0.0);
    }

    #[test]
    fn test_distractor_accepted_is_false_positive() {
        let results = vec![
            probe(1, &[(1, 1.0)], true),
            probe(2, &[(2, 1.0)], true),
            probe(3, &[(1, 0.9)], true),
        ];
        let counts = DecisionCounts::classify(&results);
        assert_eq!(counts.false_positive, 1);
        assert!((counts.far() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_four_classes_and_count_invariant() {
        let results = vec![
            probe(1, &[(1, 0.9)], true),
            probe(1, &[(2, 0.9)], true),
            probe(2, &[(2, 0.9)], false),
            probe(2, &[(1, 0.9)], false),
            probe(4, &[], false),
            probe(4, &[], true),
        ];
        let counts = DecisionCounts::classify(&results);
        assert_eq!(
            counts,
            DecisionCounts {
                true_positive: 1,
                false_positive: 2,
                false_negative: 1,
                true_negative: 2,
            }
        );
        assert_eq!(counts.total(), results.len());
        assert!((counts.frr() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sentinel_label_is_never_a_hit() {
        let mut p = probe(1, &[], true);
        p.candidates.push(crate::engine::Candidate::default());
        let counts = DecisionCounts::classify(&[p]);
        assert_eq!(counts.false_positive, 1);
    }

    #[test]
    fn test_empty_results() {
        let counts = DecisionCounts::classify(&[]);
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.far(), 0.0);
        assert_eq!(counts.frr(), 0.0);
    }
}
