//! Cumulative Match Characteristic.

use serde::{Deserialize, Serialize};

use super::{ProbeResult, guarded_ratio};
use crate::engine::Label;

/// One point of a CMC curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmcPoint {
    /// Rank, starting at 1.
    pub rank: usize,
    /// Fraction of mate probes whose true subject appears within `rank`.
    pub tpir: f64,
}

/// Compute the CMC curve over mate probes.
///
/// For each mate probe, the first candidate position holding the true
/// subject is counted once. `CMC[r]` is the cumulative count up to rank `r`
/// divided by the number of mate probes. Ranks run from 1 to the longest
/// candidate list in `results`.
#[must_use]
pub fn compute_cmc(results: &[ProbeResult], enroll_label_max: Label) -> Vec<CmcPoint> {
    let ranks = results.iter().map(|r| r.candidates.len()).max().unwrap_or(0);
    if ranks == 0 {
        return Vec::new();
    }

    let mut rank_frequency = vec![0usize; ranks];
    let mut mate_probes = 0usize;

    for result in results.iter().filter(|r| r.is_mate(enroll_label_max)) {
        mate_probes += 1;
        if let Some(j) = result.candidates.iter().position(|c| c.matches(result.truth)) {
            rank_frequency[j] += 1;
        }
    }

    let mut cumulative = 0usize;
    rank_frequency
        .iter()
        .enumerate()
        .map(|(j, &hits)| {
            cumulative += hits;
            CmcPoint {
                rank: j + 1,
                tpir: guarded_ratio(cumulative, mate_probes),
            }
        })
        .collect()
}
