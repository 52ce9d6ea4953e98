//! Dataset inspection command.

use std::path::Path;

use anyhow::{Context, Result};
use irpi_eval::{Dataset, DatasetPlan};

pub fn run(path: &Path, etpp: usize, itpp: usize, distractors: bool) -> Result<()> {
    let dataset = Dataset::discover(path)
        .with_context(|| format!("Failed to scan dataset in {}", path.display()))?;
    let plan = DatasetPlan::new(&dataset, etpp, itpp, distractors);

    println!("Dataset: {}", dataset.root.display());
    println!("  Subject dirs:   {}", dataset.subjects.len());
    println!("  Qualifying:     {} (need {} images each)", plan.subjects.len(), etpp + itpp);
    println!("  Loose images:   {}", dataset.distractors.len());
    println!("  Enrollment:     {} templates", plan.enrollment_template_count());
    println!(
        "  Identification: {} templates ({} distractors)",
        plan.identification_template_count(),
        plan.distractors.len()
    );
    println!("  Max enrolled label: {}", plan.enroll_label_max);
    println!();

    for subject in &plan.subjects {
        println!(
            "{:>6}\t{}\t{} enroll\t{} ident",
            subject.label,
            subject.name,
            subject.enrollment.len(),
            subject.identification.len()
        );
    }
    for skipped in &plan.skipped {
        println!(
            "{:>6}\t{}\tskipped ({} images)",
            skipped.label, skipped.name, skipped.file_count
        );
    }
    for distractor in &plan.distractors {
        println!("{:>6}\t{}\tdistractor", distractor.label, distractor.path.display());
    }

    Ok(())
}
