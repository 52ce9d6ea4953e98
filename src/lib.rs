//! # irpi-eval
//!
//! Conformance and benchmark harness for 1:N image identification engines.
//!
//! The library drives a pluggable engine through enrollment, gallery
//! finalization, search-template creation and search over a labeled image
//! corpus, timing every stage. The search results are then evaluated into
//! CMC and DET curves, FAR/FRR from the engine's own decisions, and a
//! significance-limited operating point.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use irpi_eval::{Benchmark, BenchmarkConfig, ColorMode, NullEngine, RunReport};
//!
//! let config = BenchmarkConfig::builder()
//!     .input_dir("./faces")
//!     .output_dir("./reports")
//!     .color_mode(ColorMode::Grayscale)
//!     .include_distractors(true)
//!     .build();
//!
//! let benchmark = Benchmark::with_file_loader(config);
//! let outcome = benchmark.run(NullEngine::new())?;
//!
//! let report = RunReport::from_outcome(&outcome);
//! report.write_json("./reports".as_ref())?;
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types and process exit codes
//! - [`engine`]: Engine contract and session state machine
//! - [`image`]: Probe image representation
//! - [`dataset`]: Dataset discovery and label assignment
//! - [`pipeline`]: Benchmark orchestration
//! - [`eval`]: CMC, DET, FAR/FRR and operating point
//! - [`report`]: Report assembly and serialization

pub mod dataset;
#[cfg(feature = "image-decode")]
pub mod decode;
pub mod engine;
pub mod error;
pub mod eval;
pub mod image;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use dataset::{Dataset, DatasetPlan};
pub use engine::{
    Candidate, IdentEngine, Label, NullEngine, ReturnCode, SearchOutcome, SessionState, Status,
    Template, TemplateRole, create_engine, engine_names,
};
pub use error::{Error, Result};
pub use eval::{CmcPoint, DecisionCounts, DetPoint, OperatingPoint, ProbeResult};
pub use image::{ColorMode, ProbeImage};
pub use pipeline::{Benchmark, BenchmarkConfig, RunContext, RunOutcome};
pub use report::RunReport;
