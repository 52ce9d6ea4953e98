//! In-memory template collections for one run.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::{Label, Template};

/// Enrollment and search templates paired with their ground truth.
///
/// Templates are moved in and moved out, never copied. The enrollment half
/// leaves the store at finalization; the search half is dropped as soon as
/// searching ends.
#[derive(Debug, Default)]
pub struct TemplateStore {
    enrollment: Vec<(Label, Template)>,
    search: Vec<(Label, Template)>,
}

impl TemplateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an enrollment template.
    pub fn push_enrollment(&mut self, label: Label, template: Template) {
        self.enrollment.push((label, template));
    }

    /// Add a search template.
    pub fn push_search(&mut self, label: Label, template: Template) {
        self.search.push((label, template));
    }

    /// Enrollment templates collected so far.
    #[must_use]
    pub fn enrollment_len(&self) -> usize {
        self.enrollment.len()
    }

    /// Search templates collected so far.
    #[must_use]
    pub fn search_len(&self) -> usize {
        self.search.len()
    }

    /// Hand the gallery over, leaving the enrollment half empty.
    pub fn take_enrollment(&mut self) -> Vec<(Label, Template)> {
        std::mem::take(&mut self.enrollment)
    }

    /// Hand the probes over, leaving the search half empty.
    pub fn take_search(&mut self) -> Vec<(Label, Template)> {
        std::mem::take(&mut self.search)
    }

    /// Reorder search templates deterministically for `seed`.
    ///
    /// Labels travel with their templates.
    pub fn shuffle_search(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.search.shuffle(&mut rng);
    }
}
