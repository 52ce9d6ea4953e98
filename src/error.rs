//! Error types for irpi-eval operations.
//!
//! Only fatal conditions are modeled here. A single failed template or
//! search is a measured quantity, not an error: the pipeline counts it in
//! [`RunContext`](crate::pipeline::RunContext) and moves on.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::{SessionState, Status};

/// Result type alias for irpi-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a benchmark run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No input directory was given.
    #[error("Empty input directory path")]
    EmptyInputPath,

    /// No output directory was given.
    #[error("Empty output directory path")]
    EmptyOutputPath,

    /// The input directory does not exist.
    #[error("Input directory does not exist: {0}")]
    InputNotFound(PathBuf),

    /// The output directory is missing and could not be created.
    #[error("Cannot create output directory {path}: {reason}")]
    OutputNotCreatable {
        /// Requested output directory.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Candidate list length of zero was requested.
    #[error("Number of candidates should be greater than zero")]
    ZeroCandidates,

    /// DET point count of zero was requested.
    #[error("Number of DET points should be greater than zero")]
    ZeroDetPoints,

    /// No subject qualifies for enrollment.
    #[error("There are 0 enrollment templates, the test cannot be performed")]
    NoEnrollmentTemplates,

    /// Neither subject probes nor distractors are available for search.
    #[error("There are 0 identification templates, the test cannot be performed")]
    NoIdentificationTemplates,

    /// The report file exists and overwriting was not allowed.
    #[error("Output file already exists: {0}")]
    ReportExists(PathBuf),

    /// The report file could not be opened for writing.
    #[error("Cannot open output file for write: {path}: {reason}")]
    ReportNotWritable {
        /// Report file path.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A session transition of the engine under test failed.
    #[error("Engine failed while entering {stage}: {status}")]
    Engine {
        /// State the session was transitioning into.
        stage: SessionState,
        /// Status returned by the engine.
        status: Status,
    },

    /// No engine is registered under the requested name.
    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    /// Failed to load a probe image.
    #[error("Image load failed: {path}: {reason}")]
    ImageLoad {
        /// Path to the image that failed to load.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Pixel buffer does not match the declared geometry.
    #[error("Pixel buffer of {actual} bytes does not match {width}x{height}x{depth}")]
    PixelBufferSize {
        /// Image width.
        width: usize,
        /// Image height.
        height: usize,
        /// Bits per pixel.
        depth: u8,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// Bit depth other than 8 or 24.
    #[error("Unsupported bit depth: {0} (expected 8 or 24)")]
    UnsupportedDepth(u8),

    /// Error scanning the dataset.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Process exit status for this error.
    ///
    /// Every fatal setup cause gets its own code so scripted runs can tell
    /// them apart. Anything else maps to 1.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::EmptyInputPath => 1,
            Self::EmptyOutputPath => 2,
            Self::InputNotFound(_) => 3,
            Self::OutputNotCreatable { .. } => 4,
            Self::ZeroCandidates => 5,
            Self::ZeroDetPoints => 6,
            Self::NoEnrollmentTemplates => 7,
            Self::NoIdentificationTemplates => 8,
            Self::ReportExists(_) => 9,
            Self::ReportNotWritable { .. } => 10,
            Self::Engine { stage, .. } => match stage {
                SessionState::EnrollmentSession => 11,
                SessionState::EnrollmentFinalized => 12,
                SessionState::IdentificationSession => 13,
                SessionState::Unconfigured => 1,
            },
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReturnCode;

    #[test]
    fn test_setup_errors_have_distinct_exit_codes() {
        let errors = [
            Error::EmptyInputPath,
            Error::EmptyOutputPath,
            Error::InputNotFound(PathBuf::from("in")),
            Error::OutputNotCreatable { path: PathBuf::from("out"), reason: String::new() },
            Error::ZeroCandidates,
            Error::ZeroDetPoints,
            Error::NoEnrollmentTemplates,
            Error::NoIdentificationTemplates,
            Error::ReportExists(PathBuf::from("r.json")),
            Error::ReportNotWritable { path: PathBuf::from("r.json"), reason: String::new() },
        ];
        let mut codes: Vec<u8> = errors.iter().map(Error::exit_code).collect();
        assert_eq!(codes, (1..=10).collect::<Vec<u8>>());
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_engine_error_exit_code_follows_stage() {
        let err = Error::Engine {
            stage: SessionState::EnrollmentFinalized,
            status: Status::new(ReturnCode::VendorError, "gallery corrupt"),
        };
        assert_eq!(err.exit_code(), 12);
        assert!(err.to_string().contains("gallery corrupt"));
    }
}
