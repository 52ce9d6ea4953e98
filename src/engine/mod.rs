//! Plugin contract for 1:N identification engines.
//!
//! An engine under test implements [`IdentEngine`]. The harness never calls
//! the trait directly: it drives the engine through the typestate wrappers in
//! [`session`], which make out-of-order calls unrepresentable.
//!
//! - [`IdentEngine`]: capability set supplied by the engine under test
//! - [`Status`], [`ReturnCode`]: failure information returned by the engine
//! - [`Template`], [`TemplateRole`]: opaque templates and their intended use
//! - [`Candidate`], [`SearchOutcome`]: ranked search output
//! - [`NullEngine`]: reference implementation that satisfies the contract

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::image::ProbeImage;

mod null;
pub mod session;

pub use null::{NullEngine, create_engine, engine_names};
pub use session::{
    EnrollmentFinalized, EnrollmentSession, IdentificationSession, SessionState, Unconfigured,
};

/// Ground-truth subject label.
pub type Label = u32;

/// Reserved label meaning "no subject". Never a valid enrolled identity.
pub const UNASSIGNED_LABEL: Label = 0;

/// Intended usage of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateRole {
    /// Gallery template for 1:N enrollment.
    Enrollment,
    /// Probe template for 1:N search.
    Search,
}

/// Return codes reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnCode {
    /// Success.
    Success,
    /// Error reading configuration files.
    ConfigError,
    /// Error writing enrollment data.
    EnrollDirError,
    /// Elective refusal to produce a template.
    TemplateCreationError,
    /// Problem setting or accessing the GPU.
    GpuError,
    /// Vendor-defined failure.
    VendorError,
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "Success",
            Self::ConfigError => "Error reading configuration files",
            Self::EnrollDirError => "Error writing enrollment data",
            Self::TemplateCreationError => "Elective refusal to produce a template",
            Self::GpuError => "Problem setting or accessing the GPU",
            Self::VendorError => "Vendor-defined error",
        };
        f.write_str(text)
    }
}

/// Failure information returned by an engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Return status code.
    pub code: ReturnCode,
    /// Optional human-readable detail.
    pub info: String,
}

impl Status {
    /// Create a status with an informational message.
    #[must_use]
    pub fn new(code: ReturnCode, info: impl Into<String>) -> Self {
        Self {
            code,
            info: info.into(),
        }
    }

    /// Create a status carrying only a code.
    #[must_use]
    pub fn from_code(code: ReturnCode) -> Self {
        Self::new(code, String::new())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.info.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} ({})", self.code, self.info)
        }
    }
}

impl std::error::Error for Status {}

/// Opaque template bytes produced by an engine.
///
/// The harness never interprets or mutates the contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template(Vec<u8>);

impl Template {
    /// Wrap engine-produced bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Template contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the template holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Template {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// One entry of a search candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Whether the engine filled this slot.
    pub is_assigned: bool,
    /// Enrolled label of the candidate.
    pub label: Label,
    /// Similarity to the probe. Higher means more likely the same subject.
    pub similarity_score: f64,
}

impl Default for Candidate {
    fn default() -> Self {
        Self {
            is_assigned: false,
            label: UNASSIGNED_LABEL,
            similarity_score: 0.0,
        }
    }
}

impl Candidate {
    /// A filled candidate slot.
    #[must_use]
    pub fn assigned(label: Label, similarity_score: f64) -> Self {
        Self {
            is_assigned: true,
            label,
            similarity_score,
        }
    }

    /// Whether this candidate identifies `truth`.
    ///
    /// Unassigned slots and the sentinel label never match.
    #[must_use]
    pub fn matches(&self, truth: Label) -> bool {
        self.is_assigned && truth != UNASSIGNED_LABEL && self.label == truth
    }
}

/// Output of one identification search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Candidates in descending score order; index 0 is the best match.
    pub candidates: Vec<Candidate>,
    /// Engine's own judgment of whether a mate is enrolled.
    pub decision: bool,
}

/// Capability set implemented by an engine under test.
///
/// Implementations need not be re-entrant. The harness calls them strictly
/// sequentially and only in the order enforced by [`session`].
pub trait IdentEngine {
    /// Engine identifier, used to name the report.
    fn name(&self) -> &str;

    /// Load resources and prepare for enrollment template creation.
    fn initialize_enrollment_session(&mut self, resource_dir: &Path) -> Result<(), Status>;

    /// Produce a template for `role` from `image`.
    ///
    /// The image is only borrowed for the duration of the call.
    fn create_template(&mut self, image: &ProbeImage, role: TemplateRole)
    -> Result<Template, Status>;

    /// Freeze the gallery. Ownership of every template passes to the engine.
    fn finalize_enrollment(&mut self, gallery: Vec<(Label, Template)>) -> Result<(), Status>;

    /// Prepare for search against the finalized gallery.
    fn initialize_identification_session(&mut self, resource_dir: &Path) -> Result<(), Status>;

    /// Search `template` against the gallery, returning at most
    /// `candidate_count` candidates sorted by descending score.
    fn identify_template(
        &mut self,
        template: &Template,
        candidate_count: usize,
    ) -> Result<SearchOutcome, Status>;
}

impl<E: IdentEngine + ?Sized> IdentEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn initialize_enrollment_session(&mut self, resource_dir: &Path) -> Result<(), Status> {
        (**self).initialize_enrollment_session(resource_dir)
    }

    fn create_template(
        &mut self,
        image: &ProbeImage,
        role: TemplateRole,
    ) -> Result<Template, Status> {
        (**self).create_template(image, role)
    }

    fn finalize_enrollment(&mut self, gallery: Vec<(Label, Template)>) -> Result<(), Status> {
        (**self).finalize_enrollment(gallery)
    }

    fn initialize_identification_session(&mut self, resource_dir: &Path) -> Result<(), Status> {
        (**self).initialize_identification_session(resource_dir)
    }

    fn identify_template(
        &mut self,
        template: &Template,
        candidate_count: usize,
    ) -> Result<SearchOutcome, Status> {
        (**self).identify_template(template, candidate_count)
    }
}
