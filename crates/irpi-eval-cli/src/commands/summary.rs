//! Report summary command.

use std::path::Path;

use anyhow::{Context, Result};
use irpi_eval::RunReport;

pub fn run(path: &Path, curves: bool) -> Result<()> {
    let report = RunReport::load(path)
        .with_context(|| format!("Failed to load report from {}", path.display()))?;

    print!("{report}");

    if curves {
        println!();
        println!("CMC");
        println!("{:-<30}", "");
        println!("{:>8}  {:>10}", "rank", "tpir");
        for p in &report.cmc {
            println!("{:>8}  {:>10.6}", p.rank, p.tpir);
        }

        if let Some(det) = &report.det {
            println!();
            println!("DET");
            println!("{:-<40}", "");
            println!("{:>12}  {:>10}  {:>10}", "threshold", "fpir", "fnir");
            for p in det {
                println!("{:>12.6}  {:>10.6}  {:>10.6}", p.threshold, p.fpir, p.fnir);
            }
        }
    }

    Ok(())
}
