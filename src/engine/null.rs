//! Reference engine that satisfies the contract without recognizing anything.

use std::path::Path;

use super::{
    Candidate, IdentEngine, Label, ReturnCode, SearchOutcome, Status, Template, TemplateRole,
};
use crate::error::{Error, Result};
use crate::image::ProbeImage;

const NULL_TEMPLATE: &[u8] = b"Long time ago in a galaxy far far away...";

/// Engine that emits a constant template and cycles through the gallery.
///
/// Useful for exercising the harness end to end: every search returns
/// `candidate_count` assigned candidates with strictly decreasing scores and
/// a positive decision.
#[derive(Debug, Default)]
pub struct NullEngine {
    gallery_labels: Vec<Label>,
}

impl NullEngine {
    /// Create an unconfigured engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentEngine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    fn initialize_enrollment_session(
        &mut self,
        _resource_dir: &Path,
    ) -> std::result::Result<(), Status> {
        Ok(())
    }

    fn create_template(
        &mut self,
        _image: &ProbeImage,
        _role: TemplateRole,
    ) -> std::result::Result<Template, Status> {
        Ok(Template::new(NULL_TEMPLATE.to_vec()))
    }

    fn finalize_enrollment(
        &mut self,
        gallery: Vec<(Label, Template)>,
    ) -> std::result::Result<(), Status> {
        self.gallery_labels = gallery.into_iter().map(|(label, _)| label).collect();
        self.gallery_labels.dedup();
        Ok(())
    }

    fn initialize_identification_session(
        &mut self,
        _resource_dir: &Path,
    ) -> std::result::Result<(), Status> {
        if self.gallery_labels.is_empty() {
            return Err(Status::new(ReturnCode::EnrollDirError, "gallery is empty"));
        }
        Ok(())
    }

    fn identify_template(
        &mut self,
        _template: &Template,
        candidate_count: usize,
    ) -> std::result::Result<SearchOutcome, Status> {
        let candidates = (0..candidate_count)
            .map(|i| {
                let label = self.gallery_labels[i % self.gallery_labels.len()];
                Candidate::assigned(label, (candidate_count - i) as f64)
            })
            .collect();
        Ok(SearchOutcome {
            candidates,
            decision: true,
        })
    }
}

/// Names accepted by [`create_engine`].
#[must_use]
pub fn engine_names() -> &'static [&'static str] {
    &["null"]
}

/// Construct the engine selected for this run.
pub fn create_engine(name: &str) -> Result<Box<dyn IdentEngine>> {
    match name {
        "null" => Ok(Box::new(NullEngine::new())),
        other => Err(Error::UnknownEngine(other.to_string())),
    }
}
