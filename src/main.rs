mod args;

use anyhow::Context;
use args::Args;
use clap::Parser;
use dupguard::Detector;
use dupguard::output::{print_report, save_report_json};
use dupguard::report::Verdict;
use log::info;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(args.log_level)
        .format_timestamp_secs()
        .init();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let start_time = Instant::now();
    let candidate_name = args.candidate_name()?;
    let detector = Detector::new(args.detector_config());
    info!("Configuration: {:?}", detector.config());

    let report = detector.check(&args.directory, &args.candidate, &candidate_name)?;
    let duration = start_time.elapsed().as_secs_f64();

    print_report(&report);

    if let Some(json_path) = &args.output_json {
        save_report_json(json_path, &report, duration)?;
        info!("Report saved to {}", json_path.display());
    }

    info!(
        "Check completed in {:.2}s: {} findings, {} files listed, {} skipped",
        duration,
        report.findings.len(),
        report.stats.entries_listed,
        report.stats.entries_skipped
    );

    Ok(match report.verdict() {
        Verdict::NoDuplicate => ExitCode::SUCCESS,
        Verdict::NameCollision | Verdict::ContentDuplicate => ExitCode::from(2),
    })
}
