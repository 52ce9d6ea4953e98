//! Detection Error Tradeoff.
//!
//! The sweep evaluates `num_points` thresholds independently against a
//! read-only view of the results, so it runs on the rayon pool. Output is
//! identical for any number of workers.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ProbeResult, guarded_ratio};
use crate::engine::Label;

/// One point of a DET curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetPoint {
    /// Score threshold this point was evaluated at.
    pub threshold: f64,
    /// Fraction of non-mate probes whose rank-1 score is `>= threshold`.
    pub fpir: f64,
    /// Fraction of mate probes whose rank-1 score is `< threshold`.
    pub fnir: f64,
}

/// Rank-1 summary of one probe.
#[derive(Clone, Copy)]
struct RankOne {
    mate: bool,
    /// `None` when the engine left the rank-1 slot unassigned.
    score: Option<f64>,
}

/// Compute the DET curve.
///
/// Thresholds are `num_points` evenly spaced values from 1% below the
/// lowest to 1% above the highest assigned rank-1 score among mate probes,
/// both ends included. Probes with empty candidate lists are left out of
/// every ratio. A probe whose rank-1 slot is unassigned stays in its
/// denominator but is never counted as a miss or an accept.
///
/// Returns an empty curve when `num_points == 0` or no mate probe has an
/// assigned rank-1 candidate.
#[must_use]
pub fn compute_det(
    results: &[ProbeResult],
    enroll_label_max: Label,
    num_points: usize,
) -> Vec<DetPoint> {
    if num_points == 0 {
        return Vec::new();
    }

    let probes: Vec<RankOne> = results
        .iter()
        .filter_map(|r| {
            let first = r.rank_one()?;
            Some(RankOne {
                mate: r.is_mate(enroll_label_max),
                score: first.is_assigned.then_some(first.similarity_score),
            })
        })
        .collect();

    let Some((low, high)) = threshold_bounds(&probes) else {
        return Vec::new();
    };

    let mate_total = probes.iter().filter(|p| p.mate).count();
    let nonmate_total = probes.len() - mate_total;
    let step = if num_points > 1 {
        (high - low) / (num_points - 1) as f64
    } else {
        0.0
    };

    (0..num_points)
        .into_par_iter()
        .map(|i| {
            let threshold = if i + 1 == num_points && num_points > 1 {
                high
            } else {
                low + i as f64 * step
            };
            let mut missed_mates = 0usize;
            let mut accepted_nonmates = 0usize;
            for p in &probes {
                let Some(score) = p.score else { continue };
                if p.mate {
                    if score < threshold {
                        missed_mates += 1;
                    }
                } else if score >= threshold {
                    accepted_nonmates += 1;
                }
            }
            DetPoint {
                threshold,
                fpir: guarded_ratio(accepted_nonmates, nonmate_total),
                fnir: guarded_ratio(missed_mates, mate_total),
            }
        })
        .collect()
}

/// Sweep range from mate rank-1 scores, widened by 1% of magnitude each way.
fn threshold_bounds(probes: &[RankOne]) -> Option<(f64, f64)> {
    let mut scores = probes
        .iter()
        .filter(|p| p.mate)
        .filter_map(|p| p.score)
        .filter(|s| s.is_finite());
    let first = scores.next()?;
    let (min, max) = scores.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s)));
    Some((min - 0.01 * min.abs(), max + 0.01 * max.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Candidate;
    use crate::eval::fixtures::probe;

    fn mixed_results() -> Vec<ProbeResult> {
        vec![
            probe(1, &[(1, 0.8), (2, 0.1)], true),
            probe(2, &[(2, 0.6), (1, 0.2)], true),
            probe(1, &[(2, 0.4), (1, 0.3)], false),
            probe(3, &[(1, 0.9)], true),
            probe(4, &[(2, 0.5)], true),
            probe(5, &[(1, 0.3)], false),
        ]
    }

    #[test]
    fn test_point_count_and_even_spacing() {
        let det = compute_det(&mixed_results(), 2, 10);
        assert_eq!(det.len(), 10);
        assert!((det[0].threshold - 0.4 * 0.99).abs() < 1e-12);
        assert!((det[9].threshold - 0.8 * 1.01).abs() < 1e-12);
        let step = det[1].threshold - det[0].threshold;
        for w in det.windows(2) {
            assert!((w[1].threshold - w[0].threshold - step).abs() < 1e-12);
        }
    }

    #[test]
    fn test_endpoints() {
        let results = vec![
            probe(1, &[(1, 0.8)], true),
            probe(2, &[(2, 0.6)], true),
            probe(3, &[(1, 0.7)], true),
        ];
        let det = compute_det(&results, 2, 50);
        let first = det.first().unwrap();
        let last = det.last().unwrap();
        assert!(first.fnir.abs() < 1e-9);
        assert!((first.fpir - 1.0).abs() < 1e-9);
        assert!((last.fnir - 1.0).abs() < 1e-9);
        assert!(last.fpir.abs() < 1e-9);
    }

    #[test]
    fn test_distractor_counts_at_or_below_its_score() {
        let results = vec![
            probe(1, &[(1, 1.0)], true),
            probe(2, &[(2, 0.5)], true),
            probe(3, &[(1, 0.9)], true),
        ];
        for p in compute_det(&results, 2, 25) {
            if p.threshold <= 0.9 {
                assert!((p.fpir - 1.0).abs() < 1e-9);
            } else {
                assert!(p.fpir.abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_fnir_nondecreasing_fpir_nonincreasing() {
        let det = compute_det(&mixed_results(), 2, 100);
        for w in det.windows(2) {
            assert!(w[1].fnir >= w[0].fnir);
            assert!(w[1].fpir <= w[0].fpir);
        }
    }

    #[test]
    fn test_empty_candidate_lists_excluded() {
        let mut results = vec![probe(1, &[(1, 0.8)], true), probe(3, &[(1, 0.9)], true)];
        results.push(probe(2, &[], true));
        results.push(probe(4, &[], true));
        let det = compute_det(&results, 2, 5);
        // Only one mate and one non-mate take part.
        assert!(det[0].fnir.abs() < 1e-9);
        assert!((det[0].fpir - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unassigned_rank_one_is_never_a_miss() {
        let mut unassigned = probe(2, &[], true);
        unassigned.candidates.push(Candidate::default());
        let results = vec![
            probe(1, &[(1, 0.8)], true),
            unassigned,
            probe(3, &[(1, 0.5)], true),
        ];
        let det = compute_det(&results, 2, 5);
        assert_eq!(det[0].fnir, 0.0);
        // At the top threshold only the assigned mate misses, out of two mates.
        assert!((det[4].fnir - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unassigned_nonmate_is_never_accepted() {
        let mut unassigned = probe(3, &[], true);
        unassigned.candidates.push(Candidate::default());
        let results = vec![probe(1, &[(1, 0.8)], true), unassigned];
        let det = compute_det(&results, 2, 3);
        assert!(det.iter().all(|p| p.fpir == 0.0));
    }

    #[test]
    fn test_negative_scores_keep_bounds_outside_range() {
        let results = vec![probe(1, &[(1, -2.0)], true), probe(2, &[(2, -1.0)], true)];
        let det = compute_det(&results, 2, 3);
        assert!(det[0].threshold < -2.0);
        assert!(det[2].threshold > -1.0);
        assert!(det[0].fnir.abs() < 1e-9);
        assert!((det[2].fnir - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(compute_det(&[], 2, 10).is_empty());
        assert!(compute_det(&mixed_results(), 2, 0).is_empty());
        // Only distractors: no mate scores to derive bounds from.
        assert!(compute_det(&[probe(3, &[(1, 0.9)], true)], 2, 10).is_empty());
        assert_eq!(compute_det(&mixed_results(), 2, 1).len(), 1);
    }

    #[test]
    fn test_worker_count_does_not_change_output() {
        let results = mixed_results();
        let parallel = compute_det(&results, 2, 257);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let serial = pool.install(|| compute_det(&results, 2, 257));
        assert_eq!(parallel, serial);
    }
}
