//! Benchmark run configuration.

use std::path::{Path, PathBuf};

use crate::image::ColorMode;

/// Configuration for one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Dataset root with one subdirectory per subject.
    pub input_dir: PathBuf,

    /// Directory receiving the report.
    pub output_dir: PathBuf,

    /// Directory handed to the engine's session initializers.
    pub resource_dir: PathBuf,

    /// Pixel layout images are decoded to.
    pub color_mode: ColorMode,

    /// Enrollment templates per subject.
    pub enroll_per_subject: usize,

    /// Identification templates per subject.
    pub ident_per_subject: usize,

    /// Candidate list length requested per search.
    pub candidate_count: usize,

    /// Number of DET thresholds.
    pub det_points: usize,

    /// Search loose root images as non-mate probes.
    pub include_distractors: bool,

    /// Shuffle search templates with this seed before searching.
    pub shuffle_seed: Option<u64>,

    /// Replace an existing report.
    pub overwrite: bool,
}

impl BenchmarkConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> BenchmarkConfigBuilder {
        BenchmarkConfigBuilder::default()
    }

    /// Path of the JSON report for `engine_name`.
    #[must_use]
    pub fn report_path(&self, engine_name: &str) -> PathBuf {
        report_path(&self.output_dir, engine_name)
    }
}

/// `<dir>/<engine>.json`.
#[must_use]
pub fn report_path(dir: &Path, engine_name: &str) -> PathBuf {
    dir.join(format!("{engine_name}.json"))
}

/// Builder for [`BenchmarkConfig`].
///
/// Unset paths stay empty and are rejected by
/// [`preflight`](crate::pipeline::preflight), not by the builder.
#[derive(Debug, Default)]
pub struct BenchmarkConfigBuilder {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    resource_dir: Option<PathBuf>,
    color_mode: Option<ColorMode>,
    enroll_per_subject: Option<usize>,
    ident_per_subject: Option<usize>,
    candidate_count: Option<usize>,
    det_points: Option<usize>,
    include_distractors: bool,
    shuffle_seed: Option<u64>,
    overwrite: bool,
}

impl BenchmarkConfigBuilder {
    /// Set the dataset root.
    #[must_use]
    pub fn input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(path.into());
        self
    }

    /// Set the report directory.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the engine resource directory.
    #[must_use]
    pub fn resource_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(path.into());
        self
    }

    /// Set the decoded pixel layout.
    #[must_use]
    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = Some(mode);
        self
    }

    /// Set enrollment templates per subject.
    #[must_use]
    pub fn enroll_per_subject(mut self, n: usize) -> Self {
        self.enroll_per_subject = Some(n);
        self
    }

    /// Set identification templates per subject.
    #[must_use]
    pub fn ident_per_subject(mut self, n: usize) -> Self {
        self.ident_per_subject = Some(n);
        self
    }

    /// Set the candidate list length.
    #[must_use]
    pub fn candidate_count(mut self, n: usize) -> Self {
        self.candidate_count = Some(n);
        self
    }

    /// Set the number of DET thresholds.
    #[must_use]
    pub fn det_points(mut self, n: usize) -> Self {
        self.det_points = Some(n);
        self
    }

    /// Search distractor images.
    #[must_use]
    pub fn include_distractors(mut self, enabled: bool) -> Self {
        self.include_distractors = enabled;
        self
    }

    /// Shuffle search templates with `seed`.
    #[must_use]
    pub fn shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.shuffle_seed = seed;
        self
    }

    /// Allow replacing an existing report.
    #[must_use]
    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> BenchmarkConfig {
        BenchmarkConfig {
            input_dir: self.input_dir.unwrap_or_default(),
            output_dir: self.output_dir.unwrap_or_default(),
            resource_dir: self.resource_dir.unwrap_or_default(),
            color_mode: self.color_mode.unwrap_or_default(),
            enroll_per_subject: self.enroll_per_subject.unwrap_or(1),
            ident_per_subject: self.ident_per_subject.unwrap_or(1),
            candidate_count: self.candidate_count.unwrap_or(64),
            det_points: self.det_points.unwrap_or(10_000),
            include_distractors: self.include_distractors,
            shuffle_seed: self.shuffle_seed,
            overwrite: self.overwrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchmarkConfig::builder().build();
        assert_eq!(config.enroll_per_subject, 1);
        assert_eq!(config.ident_per_subject, 1);
        assert_eq!(config.candidate_count, 64);
        assert_eq!(config.det_points, 10_000);
        assert_eq!(config.color_mode, ColorMode::Rgb);
        assert!(!config.include_distractors);
        assert!(config.shuffle_seed.is_none());
        assert!(!config.overwrite);
        assert!(config.input_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_builder() {
        let config = BenchmarkConfig::builder()
            .input_dir("/data/faces")
            .output_dir("/tmp/out")
            .color_mode(ColorMode::Grayscale)
            .enroll_per_subject(2)
            .ident_per_subject(3)
            .candidate_count(10)
            .det_points(100)
            .include_distractors(true)
            .shuffle_seed(Some(7))
            .overwrite(true)
            .build();

        assert_eq!(config.input_dir, PathBuf::from("/data/faces"));
        assert_eq!(config.enroll_per_subject, 2);
        assert_eq!(config.ident_per_subject, 3);
        assert_eq!(config.shuffle_seed, Some(7));
        assert_eq!(config.report_path("null"), PathBuf::from("/tmp/out/null.json"));
    }
}
