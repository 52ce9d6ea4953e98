//! Benchmark orchestration.
//!
//! A run goes through four stages, each timed:
//!
//! 1. **Enrollment**: open the enrollment session and create one template per
//!    enrollment image of every qualifying subject.
//! 2. **Finalization**: hand the gallery to the engine.
//! 3. **Identification templates**: open the identification session and
//!    create search templates for subject probes, then for distractors.
//! 4. **Search**: search every template against the gallery.
//!
//! Setup problems are caught by [`preflight`] before the engine is touched.
//! A failing image or template is counted and skipped. A failing session
//! transition aborts the run.
//!
//! ## Example
//!
//! ```rust,ignore
//! use irpi_eval::pipeline::{Benchmark, BenchmarkConfig};
//! use irpi_eval::NullEngine;
//!
//! let config = BenchmarkConfig::builder()
//!     .input_dir("./faces")
//!     .output_dir("./reports")
//!     .build();
//! let benchmark = Benchmark::with_file_loader(config);
//! let outcome = benchmark.run(NullEngine::new())?;
//! ```

pub mod config;
pub mod context;
pub mod store;

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};

pub use config::{BenchmarkConfig, BenchmarkConfigBuilder, report_path};
pub use context::{RunContext, SearchCounters, StageCounters};
pub use store::TemplateStore;

use crate::dataset::{Dataset, DatasetPlan};
use crate::engine::{
    EnrollmentFinalized, EnrollmentSession, IdentEngine, IdentificationSession, Label, Status,
    Template, Unconfigured,
};
use crate::error::{Error, Result};
use crate::eval::ProbeResult;
use crate::image::ProbeImage;

/// Turns an image path into a probe image.
pub type ImageLoader = Box<dyn Fn(&Path) -> Result<ProbeImage>>;

/// Validate a configuration and plan the dataset.
///
/// Checks run in a fixed order and the first failure is returned, so the
/// resulting [`Error::exit_code`] is deterministic. The output directory is
/// created when missing.
pub fn preflight(config: &BenchmarkConfig, engine_name: &str) -> Result<DatasetPlan> {
    if config.input_dir.as_os_str().is_empty() {
        return Err(Error::EmptyInputPath);
    }
    if config.output_dir.as_os_str().is_empty() {
        return Err(Error::EmptyOutputPath);
    }
    if !config.input_dir.is_dir() {
        return Err(Error::InputNotFound(config.input_dir.clone()));
    }
    if !config.output_dir.is_dir() {
        fs::create_dir_all(&config.output_dir).map_err(|e| Error::OutputNotCreatable {
            path: config.output_dir.clone(),
            reason: e.to_string(),
        })?;
    }
    if config.candidate_count == 0 {
        return Err(Error::ZeroCandidates);
    }
    if config.det_points == 0 {
        return Err(Error::ZeroDetPoints);
    }

    let dataset = Dataset::discover(&config.input_dir)?;
    let plan = DatasetPlan::new(
        &dataset,
        config.enroll_per_subject,
        config.ident_per_subject,
        config.include_distractors,
    );
    tracing::info!(
        input = %config.input_dir.display(),
        subject_dirs = dataset.subjects.len(),
        qualifying = plan.subjects.len(),
        distractors = plan.distractors.len(),
        "dataset planned"
    );

    if plan.enrollment_template_count() == 0 {
        return Err(Error::NoEnrollmentTemplates);
    }
    if plan.identification_template_count() == 0 {
        return Err(Error::NoIdentificationTemplates);
    }

    check_report_target(&config.report_path(engine_name), config.overwrite)?;
    Ok(plan)
}

/// Refuse an existing report unless overwriting, and make sure the file can
/// be opened for writing. A file created by the probe is removed again.
fn check_report_target(path: &Path, overwrite: bool) -> Result<()> {
    let existed = path.exists();
    if existed && !overwrite {
        return Err(Error::ReportExists(path.to_path_buf()));
    }
    let not_writable = |e: std::io::Error| Error::ReportNotWritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(not_writable)?;
    if !existed {
        fs::remove_file(path).map_err(not_writable)?;
    }
    Ok(())
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Identifier of the engine under test.
    pub engine_name: String,
    /// Dataset plan the run followed.
    pub plan: DatasetPlan,
    /// One entry per successful search.
    pub results: Vec<ProbeResult>,
    /// Counters and timings.
    pub context: RunContext,
    /// Candidate list length requested per search.
    pub candidate_count: usize,
    /// Number of DET thresholds to evaluate.
    pub det_points: usize,
    /// When preflight passed.
    pub started_at: DateTime<Utc>,
    /// When the last search returned.
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    /// Highest enrolled label; probes above it are non-mates.
    #[must_use]
    pub fn enroll_label_max(&self) -> Label {
        self.plan.enroll_label_max
    }
}

/// Drives one engine through a full benchmark run.
pub struct Benchmark {
    config: BenchmarkConfig,
    loader: ImageLoader,
}

impl Benchmark {
    /// Create a benchmark over `config`, loading images with `loader`.
    #[must_use]
    pub fn new(config: BenchmarkConfig, loader: ImageLoader) -> Self {
        Self { config, loader }
    }

    /// Create a benchmark that decodes images from disk in the configured
    /// [`ColorMode`](crate::image::ColorMode).
    #[cfg(feature = "image-decode")]
    #[must_use]
    pub fn with_file_loader(config: BenchmarkConfig) -> Self {
        let loader = crate::decode::file_loader(config.color_mode);
        Self::new(config, loader)
    }

    /// Run configuration.
    #[must_use]
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run all four stages against `engine`.
    pub fn run<E: IdentEngine>(&self, engine: E) -> Result<RunOutcome> {
        let engine = Unconfigured::new(engine);
        let engine_name = engine.engine_name().to_string();
        let plan = preflight(&self.config, &engine_name)?;
        let started_at = Utc::now();
        let resource_dir = self.config.resource_dir.as_path();

        let mut context = RunContext::default();
        let mut store = TemplateStore::new();

        // Enrollment
        tracing::info!(
            engine = %engine_name,
            state = %Unconfigured::<E>::STATE,
            "initializing enrollment session"
        );
        let timer = Instant::now();
        let session = engine.initialize_enrollment(resource_dir);
        context.enrollment_init = timer.elapsed();
        let mut session = session?;
        tracing::info!(
            engine = session.engine_name(),
            state = %EnrollmentSession::<E>::STATE,
            elapsed_ms = context.enrollment_init.as_secs_f64() * 1e3,
            "session open"
        );

        for subject in &plan.subjects {
            tracing::debug!(label = subject.label, name = %subject.name, "enrolling subject");
            for path in &subject.enrollment {
                let template = self.create_template(path, &mut context.enrollment, |image| {
                    session.create_template(image)
                });
                if let Some(template) = template {
                    store.push_enrollment(subject.label, template);
                }
            }
        }
        tracing::info!(
            attempted = context.enrollment.attempted,
            errors = context.enrollment.errors,
            mean_ms = context.enrollment.mean_generation_time().as_secs_f64() * 1e3,
            template_bytes = context.enrollment.template_size.unwrap_or(0),
            "enrollment templates created"
        );

        // Finalization
        tracing::info!(templates = store.enrollment_len(), "finalizing enrollment");
        let gallery = store.take_enrollment();
        let timer = Instant::now();
        let finalized = session.finalize(gallery);
        context.finalize = timer.elapsed();
        let finalized = finalized?;
        tracing::info!(
            engine = finalized.engine_name(),
            state = %EnrollmentFinalized::<E>::STATE,
            elapsed_ms = context.finalize.as_secs_f64() * 1e3,
            "gallery finalized"
        );

        // Identification templates
        tracing::info!("initializing identification session");
        let timer = Instant::now();
        let session = finalized.initialize_identification(resource_dir);
        context.identification_init = timer.elapsed();
        let mut session = session?;
        tracing::info!(
            engine = session.engine_name(),
            state = %IdentificationSession::<E>::STATE,
            elapsed_ms = context.identification_init.as_secs_f64() * 1e3,
            "session open"
        );

        for subject in &plan.subjects {
            for path in &subject.identification {
                let template = self.create_template(path, &mut context.identification, |image| {
                    session.create_template(image)
                });
                if let Some(template) = template {
                    store.push_search(subject.label, template);
                }
            }
        }
        for distractor in &plan.distractors {
            let template = self.create_template(
                &distractor.path,
                &mut context.identification,
                |image| session.create_template(image),
            );
            if let Some(template) = template {
                store.push_search(distractor.label, template);
            }
        }
        tracing::info!(
            attempted = context.identification.attempted,
            errors = context.identification.errors,
            distractors = plan.distractors.len(),
            mean_ms = context.identification.mean_generation_time().as_secs_f64() * 1e3,
            "identification templates created"
        );

        if let Some(seed) = self.config.shuffle_seed {
            tracing::info!(seed, "shuffling search templates");
            store.shuffle_search(seed);
        }

        // Search
        tracing::info!(templates = store.search_len(), "searching gallery");
        let probes = store.take_search();
        let mut results = Vec::with_capacity(probes.len());
        for (truth, template) in probes {
            let timer = Instant::now();
            let outcome = session.identify(&template, self.config.candidate_count);
            context.search.record(timer.elapsed(), outcome.is_ok());
            match outcome {
                Ok(outcome) => {
                    tracing::debug!(
                        truth,
                        candidates = outcome.candidates.len(),
                        decision = outcome.decision,
                        "search complete"
                    );
                    results.push(ProbeResult::new(truth, outcome.candidates, outcome.decision));
                }
                Err(status) => {
                    tracing::warn!(truth, status = %status, "search failed");
                }
            }
        }
        tracing::info!(
            searches = context.search.attempted,
            errors = context.search.errors,
            mean_us = context.search.mean_time().as_secs_f64() * 1e6,
            "search finished"
        );

        Ok(RunOutcome {
            engine_name,
            plan,
            results,
            context,
            candidate_count: self.config.candidate_count,
            det_points: self.config.det_points,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Load one image and create a template from it, updating `counters`.
    fn create_template<F>(
        &self,
        path: &Path,
        counters: &mut StageCounters,
        create: F,
    ) -> Option<Template>
    where
        F: FnOnce(&ProbeImage) -> std::result::Result<Template, Status>,
    {
        let image = match (self.loader)(path) {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "image load failed");
                counters.record_failure();
                return None;
            }
        };

        let timer = Instant::now();
        match create(&image) {
            Ok(template) => {
                counters.record_success(timer.elapsed(), template.len());
                tracing::debug!(path = %path.display(), bytes = template.len(), "template created");
                Some(template)
            }
            Err(status) => {
                counters.record_failure();
                tracing::warn!(path = %path.display(), status = %status, "template creation failed");
                None
            }
        }
    }
}
