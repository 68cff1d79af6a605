use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use supports_hyperlinks::Stream;

use crate::report::{Finding, Report};

#[derive(Serialize)]
struct ReportDocument<'a> {
    #[serde(flatten)]
    report: &'a Report,
    check_duration_seconds: f64,
}

fn format_path(path: &Path) -> String {
    if supports_hyperlinks::on(Stream::Stdout) {
        let display = path.display();
        let uri = format!("file://{}", path.display());
        format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", uri, display)
    } else {
        path.display().to_string()
    }
}

pub fn print_report(report: &Report) {
    if report.is_unique() {
        println!("{}", "No duplicates found.".green());
        return;
    }

    let mut content_duplicates = 0;
    for finding in &report.findings {
        match finding {
            Finding::NameCollision {
                existing_name,
                candidate_name,
            } => {
                println!("{}", "Duplicate found:".yellow().bold());
                println!("  {}  ==  {}", existing_name, candidate_name);
                println!(
                    "\"{}\" {} a file with the same name already exists, rename it and try again",
                    candidate_name,
                    "not copied:".red().bold()
                );
            }
            Finding::ContentDuplicate {
                new_path,
                existing_path,
            } => {
                if content_duplicates == 0 {
                    println!("{}", "Duplicate found:".yellow().bold());
                }
                content_duplicates += 1;
                println!(
                    "  {}  {}  {}",
                    format_path(new_path),
                    "==".dimmed(),
                    format_path(existing_path)
                );
            }
        }
    }

    if !report.candidate_duplicates().is_empty() {
        println!(
            "\"{}\" {} a file with the same content already exists",
            report.candidate.display(),
            "not copied:".red().bold()
        );
    }
}

pub fn save_report_json(path: &Path, report: &Report, duration: f64) -> Result<()> {
    let document = ReportDocument {
        report,
        check_duration_seconds: duration,
    };

    let json =
        serde_json::to_string_pretty(&document).context("Failed to serialize report to JSON")?;

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open output file: {}", path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON output")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_save_report_json() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("report.json");

        let mut report = Report::new(PathBuf::from("/in/c.txt"), "sha1");
        report.findings.push(Finding::ContentDuplicate {
            new_path: PathBuf::from("/dir/a.txt"),
            existing_path: PathBuf::from("/in/c.txt"),
        });
        report.stats.full_hashes = 2;

        save_report_json(&out, &report, 0.5).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["candidate"], "/in/c.txt");
        assert_eq!(value["algorithm"], "sha1");
        assert_eq!(value["check_duration_seconds"], 0.5);
        assert_eq!(value["stats"]["full_hashes"], 2);
        assert_eq!(value["findings"][0]["kind"], "content_duplicate");
    }

    #[test]
    fn test_save_report_json_overwrites() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("report.json");
        fs::write(&out, "x".repeat(10_000)).unwrap();

        let report = Report::new(PathBuf::from("/in/c.txt"), "blake3");
        save_report_json(&out, &report, 0.0).unwrap();

        let parsed: Report = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_save_report_json_bad_path() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("missing").join("report.json");
        let report = Report::new(PathBuf::from("/in/c.txt"), "blake3");
        assert!(save_report_json(&out, &report, 0.0).is_err());
    }
}
