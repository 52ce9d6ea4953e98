//! Labeled probe datasets.
//!
//! An input root holds one subdirectory per subject plus, optionally, loose
//! "distractor" images with no subject. Subjects receive labels 1, 2, 3, ...
//! in sorted directory order; label 0 is never used.
//!
//! ## Example
//!
//! ```rust,ignore
//! use irpi_eval::dataset::{Dataset, DatasetPlan};
//!
//! let dataset = Dataset::discover("./faces")?;
//! let plan = DatasetPlan::new(&dataset, 1, 2, true);
//! println!("{} subjects qualify", plan.subjects.len());
//! ```

mod discovery;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use discovery::SUPPORTED_EXTENSIONS;

use crate::engine::Label;
use crate::error::Result;

/// One subject directory and its eligible images, sorted by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectDir {
    /// Directory name.
    pub name: String,
    /// Eligible image files in name order.
    pub files: Vec<PathBuf>,
}

/// Result of scanning an input root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Input root.
    pub root: PathBuf,
    /// Subject directories in name order.
    pub subjects: Vec<SubjectDir>,
    /// Loose images directly under the root, in name order.
    pub distractors: Vec<PathBuf>,
}

impl Dataset {
    /// Scan a directory.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        discovery::discover_dataset(path.as_ref())
    }
}

/// A subject that holds enough images to take part in the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedSubject {
    /// Ground-truth label.
    pub label: Label,
    /// Directory name.
    pub name: String,
    /// The first `etpp` files.
    pub enrollment: Vec<PathBuf>,
    /// The next `itpp` files.
    pub identification: Vec<PathBuf>,
}

/// A subject directory skipped for holding too few images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedSubject {
    /// Label the directory consumed.
    pub label: Label,
    /// Directory name.
    pub name: String,
    /// Number of eligible images found.
    pub file_count: usize,
}

/// A loose image searched without a mate in the gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedDistractor {
    /// Label above every subject label.
    pub label: Label,
    /// Image file.
    pub path: PathBuf,
}

/// Assignment of files to roles and labels for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetPlan {
    /// Enrollment templates per subject.
    pub enroll_per_subject: usize,
    /// Identification templates per subject.
    pub ident_per_subject: usize,
    /// Qualifying subjects in label order.
    pub subjects: Vec<PlannedSubject>,
    /// Under-qualified subjects. Their labels are consumed but never used.
    pub skipped: Vec<SkippedSubject>,
    /// Distractor probes, empty unless distractors are enabled.
    pub distractors: Vec<PlannedDistractor>,
    /// Highest label of a qualifying subject. Probes above it have no mate.
    pub enroll_label_max: Label,
}

impl DatasetPlan {
    /// Assign labels and roles.
    ///
    /// A subject qualifies with at least `etpp + itpp` files (`etpp` when
    /// `itpp == 0`). Every subject directory consumes one label whether or
    /// not it qualifies, so directory order and label order stay aligned.
    #[must_use]
    pub fn new(dataset: &Dataset, etpp: usize, itpp: usize, include_distractors: bool) -> Self {
        let min_files = if itpp == 0 { etpp } else { etpp + itpp };

        let mut subjects = Vec::new();
        let mut skipped = Vec::new();

        for (index, subject) in dataset.subjects.iter().enumerate() {
            let label = index as Label + 1;
            if subject.files.len() >= min_files {
                subjects.push(PlannedSubject {
                    label,
                    name: subject.name.clone(),
                    enrollment: subject.files[..etpp].to_vec(),
                    identification: subject.files[etpp..min_files].to_vec(),
                });
            } else {
                skipped.push(SkippedSubject {
                    label,
                    name: subject.name.clone(),
                    file_count: subject.files.len(),
                });
            }
        }

        let first_distractor = dataset.subjects.len() as Label + 1;
        let distractors = if include_distractors {
            dataset
                .distractors
                .iter()
                .enumerate()
                .map(|(i, path)| PlannedDistractor {
                    label: first_distractor + i as Label,
                    path: path.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let enroll_label_max = subjects.last().map_or(0, |s| s.label);

        Self {
            enroll_per_subject: etpp,
            ident_per_subject: itpp,
            subjects,
            skipped,
            distractors,
            enroll_label_max,
        }
    }

    /// Number of enrollment templates the run will attempt.
    #[must_use]
    pub fn enrollment_template_count(&self) -> usize {
        self.subjects.len() * self.enroll_per_subject
    }

    /// Number of subject probes the run will attempt, excluding distractors.
    #[must_use]
    pub fn mate_probe_count(&self) -> usize {
        self.subjects.len() * self.ident_per_subject
    }

    /// Number of identification templates the run will attempt.
    #[must_use]
    pub fn identification_template_count(&self) -> usize {
        self.mate_probe_count() + self.distractors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(name: &str, files: usize) -> SubjectDir {
        SubjectDir {
            name: name.to_string(),
            files: (0..files).map(|i| PathBuf::from(format!("{name}/{i}.png"))).collect(),
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            root: PathBuf::from("root"),
            subjects: vec![subject("a", 3), subject("b", 1), subject("c", 2), subject("d", 0)],
            distractors: vec![PathBuf::from("x.png"), PathBuf::from("y.png")],
        }
    }

    #[test]
    fn test_skipped_subjects_consume_labels() {
        let plan = DatasetPlan::new(&dataset(), 1, 1, false);
        let labels: Vec<Label> = plan.subjects.iter().map(|s| s.label).collect();
        assert_eq!(labels, [1, 3]);
        let skipped: Vec<Label> = plan.skipped.iter().map(|s| s.label).collect();
        assert_eq!(skipped, [2, 4]);
        assert_eq!(plan.enroll_label_max, 3);
        assert!(plan.distractors.is_empty());
    }

    #[test]
    fn test_roles_follow_sorted_file_order() {
        let plan = DatasetPlan::new(&dataset(), 1, 2, false);
        assert_eq!(plan.subjects.len(), 1);
        let a = &plan.subjects[0];
        assert_eq!(a.enrollment, [PathBuf::from("a/0.png")]);
        assert_eq!(a.identification, [PathBuf::from("a/1.png"), PathBuf::from("a/2.png")]);
    }

    #[test]
    fn test_zero_ident_requires_only_enrollment_files() {
        let plan = DatasetPlan::new(&dataset(), 1, 0, false);
        assert_eq!(plan.subjects.len(), 3);
        assert!(plan.subjects.iter().all(|s| s.identification.is_empty()));
        assert_eq!(plan.identification_template_count(), 0);
    }

    #[test]
    fn test_distractor_labels_follow_all_subject_dirs() {
        let plan = DatasetPlan::new(&dataset(), 1, 1, true);
        let labels: Vec<Label> = plan.distractors.iter().map(|d| d.label).collect();
        assert_eq!(labels, [5, 6]);
        assert!(labels.iter().all(|&l| l > plan.enroll_label_max));
        assert_eq!(plan.enrollment_template_count(), 2);
        assert_eq!(plan.identification_template_count(), 4);
    }
}
