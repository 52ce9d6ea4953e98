//! Statistically meaningful operating point.
//!
//! A rate measured over `n` trials cannot be resolved below roughly
//! `CONFIDENT_EXAMPLES / n`. The operating point pins FPIR to the smallest
//! power of ten above that floor and reads FNIR off the DET curve there.

use serde::{Deserialize, Serialize};

use super::DetPoint;

/// Number of observed errors needed before a rate is trusted.
pub const CONFIDENT_EXAMPLES: usize = 3;

/// Smallest power of ten that is resolvable over `trials` trials.
///
/// `10^ceil(log10(3 / trials))`, capped at 1.0.
#[must_use]
pub fn significance_floor(trials: usize) -> f64 {
    if trials == 0 {
        return 1.0;
    }
    10f64.powi(significance_exponent(trials).min(0))
}

/// Decimal places worth printing for a rate measured over `trials` trials.
#[must_use]
pub fn decimal_places(trials: usize) -> usize {
    if trials == 0 {
        return 0;
    }
    usize::try_from(-significance_exponent(trials)).unwrap_or(0)
}

fn significance_exponent(trials: usize) -> i32 {
    (CONFIDENT_EXAMPLES as f64 / trials as f64).log10().ceil() as i32
}

/// Lowest FNIR among DET points with `fpir <= target_fpir`, or 1.0.
#[must_use]
pub fn fnir_at_fpir(det: &[DetPoint], target_fpir: f64) -> f64 {
    det.iter()
        .filter(|p| p.fpir <= target_fpir)
        .map(|p| p.fnir)
        .fold(1.0, f64::min)
}

/// FPIR/FNIR pair reported as the engine's operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    /// Target false-positive identification rate.
    pub fpir: f64,
    /// Miss rate achieved at `fpir`.
    pub fnir: f64,
}

impl OperatingPoint {
    /// Pick the operating point for a run.
    ///
    /// Non-mate trials are `distractors * enroll_per_subject`. Without
    /// distractors nothing bounds FPIR, so both rates are reported as 1.0.
    #[must_use]
    pub fn select(det: &[DetPoint], distractors: usize, enroll_per_subject: usize) -> Self {
        if distractors == 0 {
            return Self::unbounded();
        }
        let fpir = significance_floor(distractors * enroll_per_subject);
        Self {
            fpir,
            fnir: fnir_at_fpir(det, fpir),
        }
    }

    /// Both rates at 1.0.
    #[must_use]
    pub fn unbounded() -> Self {
        Self { fpir: 1.0, fnir: 1.0 }
    }
}

/// Template rejection rate floored at the resolvable minimum.
///
/// `max(errors / total, 3 / total)`; 0 when nothing was attempted. Runs with
/// fewer than 3 attempts report more than 1.0.
#[must_use]
pub fn rejection_rate(errors: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    (errors as f64 / total).max(CONFIDENT_EXAMPLES as f64 / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(fpir: f64, fnir: f64) -> DetPoint {
        DetPoint {
            threshold: 0.0,
            fpir,
            fnir,
        }
    }

    #[test]
    fn test_significance_floor() {
        assert!((significance_floor(3) - 1.0).abs() < 1e-12);
        assert!((significance_floor(50) - 0.1).abs() < 1e-12);
        assert!((significance_floor(100) - 0.1).abs() < 1e-12);
        assert!((significance_floor(1000) - 0.01).abs() < 1e-12);
        assert!((significance_floor(0) - 1.0).abs() < 1e-12);
        assert!((significance_floor(1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(1), 0);
        assert_eq!(decimal_places(50), 1);
        assert_eq!(decimal_places(1000), 2);
        assert_eq!(decimal_places(0), 0);
    }

    #[test]
    fn test_fnir_at_fpir() {
        let det = [point(1.0, 0.0), point(0.2, 0.1), point(0.05, 0.3), point(0.0, 0.9)];
        assert!((fnir_at_fpir(&det, 0.1) - 0.3).abs() < 1e-12);
        assert!((fnir_at_fpir(&det, 0.5) - 0.1).abs() < 1e-12);
        assert!((fnir_at_fpir(&[point(0.5, 0.2)], 0.1) - 1.0).abs() < 1e-12);
        assert!((fnir_at_fpir(&[], 0.1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_operating_point_without_distractors() {
        let det = [point(0.0, 0.0)];
        assert_eq!(OperatingPoint::select(&det, 0, 1), OperatingPoint::unbounded());
    }

    #[test]
    fn test_operating_point_with_distractors() {
        let det = [point(0.5, 0.0), point(0.09, 0.25), point(0.0, 0.75)];
        let op = OperatingPoint::select(&det, 25, 2);
        assert!((op.fpir - 0.1).abs() < 1e-12);
        assert!((op.fnir - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_rejection_rate_floor() {
        assert!((rejection_rate(0, 10) - 0.3).abs() < 1e-12);
        assert!((rejection_rate(5, 10) - 0.5).abs() < 1e-12);
        assert_eq!(rejection_rate(0, 0), 0.0);
        // Too few attempts to resolve anything below the floor.
        assert!((rejection_rate(0, 2) - 1.5).abs() < 1e-12);
        assert!((rejection_rate(2, 2) - 1.5).abs() < 1e-12);
    }
}
