//! Evaluation of identification results.
//!
//! Pure functions that turn per-probe candidate lists into curves and rates.
//! Nothing here fails: every ratio is epsilon-guarded so an empty class
//! degrades toward zero, and an empty result set yields empty curves.
//!
//! - [`rates`]: FAR/FRR from the engine's own open-set decisions
//! - [`cmc`]: Cumulative Match Characteristic over mate probes
//! - [`det`]: Detection Error Tradeoff swept over rank-1 scores
//! - [`operating`]: statistically meaningful operating point and rejection rates
//!
//! Candidate lists are consumed exactly as the engine ordered them; index 0
//! is the best match and nothing here re-sorts.

pub mod cmc;
pub mod det;
pub mod operating;
pub mod rates;

use serde::{Deserialize, Serialize};

pub use cmc::{CmcPoint, compute_cmc};
pub use det::{DetPoint, compute_det};
pub use operating::{CONFIDENT_EXAMPLES, OperatingPoint, fnir_at_fpir, rejection_rate};
pub use rates::DecisionCounts;

use crate::engine::{Candidate, Label};

/// Guard added to every denominator.
pub const EPSILON: f64 = 1e-10;

/// Outcome of one successful search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Ground-truth label of the probe.
    pub truth: Label,
    /// Candidates in engine order, best first.
    pub candidates: Vec<Candidate>,
    /// Engine's open-set decision.
    pub decision: bool,
}

impl ProbeResult {
    /// Bundle one search outcome with its ground truth.
    #[must_use]
    pub fn new(truth: Label, candidates: Vec<Candidate>, decision: bool) -> Self {
        Self {
            truth,
            candidates,
            decision,
        }
    }

    /// Whether the probe's subject is enrolled.
    #[must_use]
    pub fn is_mate(&self, enroll_label_max: Label) -> bool {
        is_mate(self.truth, enroll_label_max)
    }

    /// Best candidate, if the engine returned any.
    #[must_use]
    pub fn rank_one(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Whether `truth` belongs to the gallery.
#[must_use]
pub fn is_mate(truth: Label, enroll_label_max: Label) -> bool {
    truth <= enroll_label_max
}

/// `numerator / (denominator + EPSILON)`.
#[inline]
pub(crate) fn guarded_ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / (denominator as f64 + EPSILON)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::ProbeResult;
    use crate::engine::{Candidate, Label};

    /// Probe whose candidates are `(label, score)` pairs in the given order.
    pub fn probe(truth: Label, ranked: &[(Label, f64)], decision: bool) -> ProbeResult {
        let candidates = ranked
            .iter()
            .map(|&(label, score)| Candidate::assigned(label, score))
            .collect();
        ProbeResult::new(truth, candidates, decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_partition() {
        assert!(is_mate(1, 2));
        assert!(is_mate(2, 2));
        assert!(!is_mate(3, 2));
    }

    #[test]
    fn test_guarded_ratio_empty_class() {
        assert_eq!(guarded_ratio(0, 0), 0.0);
        assert!((guarded_ratio(1, 2) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rank_one() {
        let p = fixtures::probe(1, &[(2, 0.9), (1, 0.5)], true);
        assert_eq!(p.rank_one().map(|c| c.label), Some(2));
        assert!(ProbeResult::new(1, Vec::new(), false).rank_one().is_none());
    }
}
