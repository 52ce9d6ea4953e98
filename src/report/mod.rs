//! Run reports.
//!
//! A [`RunReport`] is assembled from a finished [`RunOutcome`]: it runs the
//! evaluation engine over the search results and collects the stage
//! counters. It serializes to JSON, writes its curves as CSV and, with the
//! `chart` feature, as SVG plots.

#[cfg(feature = "chart")]
pub mod chart;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::eval::operating::{decimal_places, rejection_rate};
use crate::eval::{
    CmcPoint, DecisionCounts, DetPoint, OperatingPoint, compute_cmc, compute_det,
};
use crate::pipeline::{RunOutcome, StageCounters, report_path};

/// Template generation summary of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    /// Templates planned for subjects (`qualifying subjects * per_person`).
    pub templates: usize,
    /// Templates per subject.
    pub per_person: usize,
    /// Distractor templates planned on top of `templates`.
    #[serde(default)]
    pub distractors: usize,
    /// Failed creations, including unreadable images.
    pub errors: usize,
    /// Mean time of a successful creation.
    #[serde(rename = "generation_time_ms", with = "duration_ms")]
    pub generation_time: Duration,
    /// Size of the first template, 0 when none was created.
    pub template_size_bytes: usize,
    /// `max(errors / attempted, 3 / attempted)`.
    ///
    /// A floored estimate, not a fraction: with fewer than 3 attempts it
    /// exceeds 1.0 even when nothing failed.
    pub rejection_rate: f64,
}

impl StageSummary {
    fn new(counters: &StageCounters, templates: usize, per_person: usize, distractors: usize) -> Self {
        Self {
            templates,
            per_person,
            distractors,
            errors: counters.errors,
            generation_time: counters.mean_generation_time(),
            template_size_bytes: counters.template_size.unwrap_or(0),
            rejection_rate: rejection_rate(counters.errors, counters.attempted),
        }
    }
}

/// Complete result of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Engine identifier.
    pub name: String,

    /// When the run started.
    #[serde(with = "chrono_serde")]
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// When the last search returned.
    #[serde(with = "chrono_serde")]
    pub finished_at: chrono::DateTime<chrono::Utc>,

    /// CMC curve over mate probes.
    pub cmc: Vec<CmcPoint>,

    /// DET curve, present only when distractors were searched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub det: Option<Vec<DetPoint>>,

    /// Confusion counts of the engine's own decisions.
    pub decisions: DecisionCounts,

    /// False accept rate from `decisions`.
    pub far: f64,

    /// False reject rate from `decisions`.
    pub frr: f64,

    /// TPIR at rank 1, 0 when the CMC is empty.
    pub tpir_rank_one: f64,

    /// Significance-limited operating point.
    pub operating_point: OperatingPoint,

    /// Enrollment template generation.
    pub enrollment: StageSummary,

    /// Search template generation.
    pub identification: StageSummary,

    /// Searches issued.
    pub searches: usize,

    /// Searches the engine failed.
    pub search_errors: usize,

    /// Mean time per search call.
    #[serde(rename = "search_time_us", with = "duration_us")]
    pub search_time: Duration,

    /// Time to open the enrollment session.
    #[serde(rename = "enrollment_init_ms", with = "duration_ms")]
    pub enrollment_init: Duration,

    /// Time to finalize the gallery.
    #[serde(rename = "finalize_ms", with = "duration_ms")]
    pub finalize: Duration,

    /// Time to open the identification session.
    #[serde(rename = "identification_init_ms", with = "duration_ms")]
    pub identification_init: Duration,
}

impl RunReport {
    /// Evaluate a finished run.
    #[must_use]
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let plan = &outcome.plan;
        let ctx = &outcome.context;
        let label_max = outcome.enroll_label_max();
        let distractors = plan.distractors.len();

        let cmc = compute_cmc(&outcome.results, label_max);
        let det = (distractors > 0)
            .then(|| compute_det(&outcome.results, label_max, outcome.det_points));
        let operating_point = OperatingPoint::select(
            det.as_deref().unwrap_or_default(),
            distractors,
            plan.enroll_per_subject,
        );
        let decisions = DecisionCounts::classify(&outcome.results);

        Self {
            name: outcome.engine_name.clone(),
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
            tpir_rank_one: cmc.first().map_or(0.0, |p| p.tpir),
            cmc,
            det,
            far: decisions.far(),
            frr: decisions.frr(),
            decisions,
            operating_point,
            enrollment: StageSummary::new(
                &ctx.enrollment,
                plan.enrollment_template_count(),
                plan.enroll_per_subject,
                0,
            ),
            identification: StageSummary::new(
                &ctx.identification,
                plan.mate_probe_count(),
                plan.ident_per_subject,
                distractors,
            ),
            searches: ctx.search.attempted,
            search_errors: ctx.search.errors,
            search_time: ctx.search.mean_time(),
            enrollment_init: ctx.enrollment_init,
            finalize: ctx.finalize,
            identification_init: ctx.identification_init,
        }
    }

    /// Read a report written by [`write_json`](Self::write_json).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at).to_std().unwrap_or_default()
    }

    /// Write `<dir>/<name>.json`.
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        let path = report_path(dir, &self.name);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(|e| Error::ReportNotWritable {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        tracing::info!(path = %path.display(), "report written");
        Ok(path)
    }

    /// Write `<dir>/<name>_cmc.csv` and, with a DET curve, `<dir>/<name>_det.csv`.
    pub fn write_curves_csv(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(2);

        let cmc_path = dir.join(format!("{}_cmc.csv", self.name));
        let mut wtr = csv::Writer::from_path(&cmc_path)?;
        wtr.write_record(["rank", "tpir"])?;
        for p in &self.cmc {
            wtr.write_record([p.rank.to_string(), format!("{:.6}", p.tpir)])?;
        }
        wtr.flush()?;
        written.push(cmc_path);

        if let Some(det) = &self.det {
            let det_path = dir.join(format!("{}_det.csv", self.name));
            let mut wtr = csv::Writer::from_path(&det_path)?;
            wtr.write_record(["threshold", "fpir", "fnir"])?;
            for p in det {
                wtr.write_record([
                    p.threshold.to_string(),
                    format!("{:.6}", p.fpir),
                    format!("{:.6}", p.fnir),
                ])?;
            }
            wtr.flush()?;
            written.push(det_path);
        }

        Ok(written)
    }

    /// Write `<dir>/<name>_cmc.svg` and, with a DET curve, `<dir>/<name>_det.svg`.
    #[cfg(feature = "chart")]
    pub fn write_charts(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(2);

        let cmc_svg = chart::cmc_svg(&self.cmc, &self.name);
        if !cmc_svg.is_empty() {
            let path = dir.join(format!("{}_cmc.svg", self.name));
            fs::write(&path, cmc_svg)?;
            written.push(path);
        }
        if let Some(det) = &self.det {
            let det_svg = chart::det_svg(det, &self.name);
            if !det_svg.is_empty() {
                let path = dir.join(format!("{}_det.svg", self.name));
                fs::write(&path, det_svg)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Trials behind the mate-side rates.
    fn mate_trials(&self) -> usize {
        self.identification.templates * self.enrollment.per_person
    }

    /// Trials behind the non-mate rates.
    fn nonmate_trials(&self) -> usize {
        self.identification.distractors * self.enrollment.per_person
    }
}

impl fmt::Display for RunReport {
    /// Human-readable summary; rates are printed only to significant places.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mate_places = decimal_places(self.mate_trials());
        let nonmate_places = decimal_places(self.nonmate_trials());
        let ms = |d: Duration| d.as_secs_f64() * 1e3;

        writeln!(f, "Engine: {}", self.name)?;
        writeln!(f, "  Started:  {}", self.started_at.to_rfc3339())?;
        writeln!(f, "  Finished: {}", self.finished_at.to_rfc3339())?;
        writeln!(f)?;
        for (title, stage) in [("Enrollment", &self.enrollment), ("Identification", &self.identification)] {
            writeln!(f, "{title} templates")?;
            writeln!(f, "  Total:     {} ({} per person)", stage.templates, stage.per_person)?;
            if stage.distractors > 0 {
                writeln!(f, "  Distractors: {}", stage.distractors)?;
            }
            writeln!(f, "  Errors:    {}", stage.errors)?;
            writeln!(f, "  Avg time:  {:.3} ms", ms(stage.generation_time))?;
            writeln!(f, "  Size:      {} bytes", stage.template_size_bytes)?;
            writeln!(f, "  Rejection: {:.4}", stage.rejection_rate)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Sessions: enroll init {:.1} ms, finalize {:.1} ms, ident init {:.1} ms",
            ms(self.enrollment_init),
            ms(self.finalize),
            ms(self.identification_init)
        )?;
        writeln!(
            f,
            "Searches: {} ({} errors), avg {:.1} us",
            self.searches,
            self.search_errors,
            self.search_time.as_secs_f64() * 1e6
        )?;
        writeln!(f, "FAR: {:.4}  FRR: {:.4}", self.far, self.frr)?;
        writeln!(f, "Best TPIR[1]: {:.*}", mate_places, self.tpir_rank_one)?;
        if self.det.is_some() {
            writeln!(
                f,
                "Best FNIR (FPIR): {:.*} ({:.*})",
                mate_places,
                self.operating_point.fnir,
                nonmate_places,
                self.operating_point.fpir
            )?;
        }
        Ok(())
    }
}

// Duration as fractional milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_secs_f64() * 1e3).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(millis / 1e3).map_err(serde::de::Error::custom)
    }
}

// Duration as fractional microseconds
mod duration_us {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_secs_f64() * 1e6).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(micros / 1e6).map_err(serde::de::Error::custom)
    }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetPlan, PlannedDistractor, PlannedSubject};
    use crate::eval::ProbeResult;
    use crate::engine::Candidate;
    use crate::pipeline::RunContext;

    fn subject(label: u32) -> PlannedSubject {
        PlannedSubject {
            label,
            name: format!("s{label}"),
            enrollment: vec![PathBuf::from("e.png")],
            identification: vec![PathBuf::from("i.png")],
        }
    }

    fn outcome(with_distractor: bool) -> RunOutcome {
        let distractors = if with_distractor {
            vec![PlannedDistractor { label: 3, path: PathBuf::from("d.png") }]
        } else {
            Vec::new()
        };
        let mut results = vec![
            ProbeResult::new(1, vec![Candidate::assigned(1, 0.9), Candidate::assigned(2, 0.1)], true),
            ProbeResult::new(2, vec![Candidate::assigned(1, 0.6), Candidate::assigned(2, 0.5)], true),
        ];
        if with_distractor {
            results.push(ProbeResult::new(3, vec![Candidate::assigned(1, 0.7)], true));
        }
        let mut context = RunContext::default();
        context.enrollment.record_success(Duration::from_millis(4), 16);
        context.enrollment.record_success(Duration::from_millis(6), 16);
        context.identification.record_success(Duration::from_millis(2), 8);
        context.identification.record_failure();
        context.search.record(Duration::from_micros(50), true);
        context.search.record(Duration::from_micros(150), true);
        let now = chrono::Utc::now();
        RunOutcome {
            engine_name: "stub".to_string(),
            plan: DatasetPlan {
                enroll_per_subject: 1,
                ident_per_subject: 1,
                subjects: vec![subject(1), subject(2)],
                skipped: Vec::new(),
                distractors,
                enroll_label_max: 2,
            },
            results,
            context,
            candidate_count: 2,
            det_points: 5,
            started_at: now,
            finished_at: now + chrono::Duration::seconds(65),
        }
    }

    #[test]
    fn test_from_outcome() {
        let report = RunReport::from_outcome(&outcome(false));
        assert_eq!(report.name, "stub");
        assert_eq!(report.cmc.len(), 2);
        assert!((report.tpir_rank_one - 0.5).abs() < 1e-9);
        assert!(report.det.is_none());
        assert_eq!(report.operating_point, OperatingPoint::unbounded());
        assert_eq!(report.enrollment.templates, 2);
        assert_eq!(report.enrollment.template_size_bytes, 16);
        assert_eq!(report.enrollment.generation_time, Duration::from_millis(5));
        assert_eq!(report.identification.errors, 1);
        assert!((report.identification.rejection_rate - 1.5).abs() < 1e-9);
        assert_eq!(report.search_time, Duration::from_micros(100));
        assert_eq!(report.elapsed(), Duration::from_secs(65));
    }

    #[test]
    fn test_det_only_with_distractors() {
        let report = RunReport::from_outcome(&outcome(true));
        let det = report.det.as_ref().unwrap();
        assert_eq!(det.len(), 5);
        assert_eq!(report.identification.distractors, 1);
        assert!((report.operating_point.fpir - 1.0).abs() < 1e-12);
        assert_eq!(report.decisions.total(), 3);
    }

    #[test]
    fn test_json_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let report = RunReport::from_outcome(&outcome(true));
        let path = report.write_json(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("stub.json"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"search_time_us\""));
        assert!(text.contains("\"generation_time_ms\""));

        let loaded = RunReport::load(&path).unwrap();
        assert_eq!(loaded.name, report.name);
        assert_eq!(loaded.cmc.len(), report.cmc.len());
        assert_eq!(loaded.det.map(|d| d.len()), Some(5));
        assert_eq!(loaded.started_at.timestamp(), report.started_at.timestamp());
    }

    #[test]
    fn test_curves_csv() {
        let dir = tempfile::tempdir().unwrap();
        let written = RunReport::from_outcome(&outcome(false))
            .write_curves_csv(dir.path())
            .unwrap();
        assert_eq!(written.len(), 1);
        let cmc = fs::read_to_string(&written[0]).unwrap();
        let mut lines = cmc.lines();
        assert_eq!(lines.next(), Some("rank,tpir"));
        assert_eq!(lines.next(), Some("1,0.500000"));
        assert_eq!(lines.next(), Some("2,1.000000"));

        let written = RunReport::from_outcome(&outcome(true))
            .write_curves_csv(dir.path())
            .unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("stub_det.csv").exists());
    }

    #[cfg(feature = "chart")]
    #[test]
    fn test_write_charts() {
        let dir = tempfile::tempdir().unwrap();
        let written = RunReport::from_outcome(&outcome(true))
            .write_charts(dir.path())
            .unwrap();
        assert_eq!(written.len(), 2);
    }

    #[test]
    fn test_display_uses_significant_places() {
        let text = RunReport::from_outcome(&outcome(true)).to_string();
        assert!(text.contains("Best TPIR[1]: 0"));
        assert!(text.contains("Best FNIR (FPIR)"));
        assert!(text.contains("Engine: stub"));
    }
}
