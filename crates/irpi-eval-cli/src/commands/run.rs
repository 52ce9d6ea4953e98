//! Benchmark run command.

use std::time::Duration;

use anyhow::{Context, Result};
use irpi_eval::{Benchmark, BenchmarkConfig, ColorMode, RunReport, create_engine, engine_names};

use crate::RunArgs;

pub fn run(args: RunArgs) -> Result<()> {
    let color_mode = if args.grayscale {
        ColorMode::Grayscale
    } else {
        ColorMode::Rgb
    };
    let shuffle_seed = args.shuffle.then(|| args.seed.unwrap_or_else(rand::random));

    let config = BenchmarkConfig::builder()
        .input_dir(&args.input)
        .output_dir(&args.output)
        .resource_dir(&args.resources)
        .color_mode(color_mode)
        .enroll_per_subject(args.enroll_per_person)
        .ident_per_subject(args.ident_per_person)
        .candidate_count(args.candidates)
        .det_points(args.det_points)
        .include_distractors(args.distractors)
        .shuffle_seed(shuffle_seed)
        .overwrite(args.overwrite)
        .build();

    let engine = create_engine(&args.engine)
        .with_context(|| format!("available engines: {}", engine_names().join(", ")))?;
    tracing::debug!(engine = %args.engine, "engine created");

    println!("Input dir:  {}", config.input_dir.display());
    println!("Output dir: {}", config.output_dir.display());
    if let Some(seed) = shuffle_seed {
        println!("Shuffle seed: {seed}");
    }

    let output_dir = config.output_dir.clone();
    let benchmark = benchmark(config)?;
    let outcome = benchmark.run(engine)?;
    let report = RunReport::from_outcome(&outcome);

    println!();
    print!("{report}");
    println!();
    println!("{}", describe_elapsed(report.elapsed()));

    let path = report.write_json(&output_dir)?;
    println!("Report: {}", path.display());
    for path in report
        .write_curves_csv(&output_dir)
        .context("Failed to write curve CSV files")?
    {
        println!("Curve:  {}", path.display());
    }
    if args.charts {
        write_charts(&report, &output_dir)?;
    }

    Ok(())
}

#[cfg(feature = "image-decode")]
fn benchmark(config: BenchmarkConfig) -> Result<Benchmark> {
    Ok(Benchmark::with_file_loader(config))
}

#[cfg(not(feature = "image-decode"))]
fn benchmark(_config: BenchmarkConfig) -> Result<Benchmark> {
    anyhow::bail!("built without image decoding; enable the `image-decode` feature")
}

#[cfg(feature = "chart")]
fn write_charts(report: &RunReport, dir: &std::path::Path) -> Result<()> {
    for path in report.write_charts(dir).context("Failed to write charts")? {
        println!("Chart:  {}", path.display());
    }
    Ok(())
}

#[cfg(not(feature = "chart"))]
fn write_charts(_report: &RunReport, _dir: &std::path::Path) -> Result<()> {
    tracing::warn!("built without the `chart` feature; skipping plots");
    Ok(())
}

/// "It took: D days H hours M minutes and S seconds".
fn describe_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let seconds = total % 60;
    format!("It took: {days} days {hours} hours {minutes} minutes and {seconds} seconds")
}
