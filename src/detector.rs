//! Checks a directory for files that conflict with an incoming candidate.
//!
//! Files are narrowed in three passes so that only files that can still
//! collide are read: equal size, then equal hash of the first
//! [`partial_hash_size`](DetectorConfig::partial_hash_size) bytes, then equal
//! hash of the whole file. A directory entry carrying the candidate's name
//! ends the check before anything is hashed.

use anyhow::{Context, Result};
use humansize::{DECIMAL, format_size};
use log::{debug, info};
use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::config::DetectorConfig;
use crate::hasher::{find_full_hash_duplicates, partial_hash_buckets};
use crate::report::{Finding, Report};
use crate::scanner::{
    FileEntry, Listing, group_by_size, scan_directory, validate_directory,
};
use crate::statistics::DetectionStats;

/// The incoming file under test.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: OsString,
    pub entry: FileEntry,
}

impl Candidate {
    pub fn new(path: &Path, name: impl Into<OsString>) -> Result<Self> {
        let entry = FileEntry::resolve(path)
            .with_context(|| format!("Cannot read candidate file {}", path.display()))?;
        Ok(Self {
            name: name.into(),
            entry,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Compares `candidate_path`, to be stored as `candidate_name`, against
    /// the current members of `directory`.
    ///
    /// Unreadable candidates and directories are errors. Members that vanish
    /// or become unreadable during the check are left out of the report.
    pub fn check(
        &self,
        directory: &Path,
        candidate_path: &Path,
        candidate_name: &OsStr,
    ) -> Result<Report> {
        self.config.validate()?;
        let candidate = Candidate::new(candidate_path, candidate_name)?;
        validate_directory(directory)?;

        info!(
            "Checking {} ({}) against {}",
            candidate.entry.path.display(),
            format_size(candidate.entry.size, DECIMAL),
            directory.display()
        );

        let mut report = Report::new(
            candidate.entry.path.clone(),
            self.config.hash_algorithm.name(),
        );
        let mut stats = DetectionStats::default();

        let files = match scan_directory(directory, &candidate.name, &mut stats)? {
            Listing::NameCollision(existing_name) => {
                info!("A file named {} already exists", existing_name);
                report.findings.push(Finding::NameCollision {
                    existing_name,
                    candidate_name: candidate.name.to_string_lossy().into_owned(),
                });
                report.stats = stats;
                return Ok(report);
            }
            Listing::Entries(files) => files,
        };
        debug!("Listed {} files", files.len());

        let size_buckets = group_by_size(candidate.entry, files, &mut stats);
        debug!(
            "{} size groups, {} with collisions",
            size_buckets.len(),
            stats.size_collision_groups
        );

        let partial_groups = partial_hash_buckets(&size_buckets, &self.config, &mut stats);
        report.findings = find_full_hash_duplicates(&partial_groups, &self.config, &mut stats);
        report.stats = stats;

        info!(
            "Found {} content duplicates after {} hashes",
            report.findings.len(),
            report.stats.hashes_computed()
        );
        Ok(report)
    }
}

/// Runs a check with the default configuration.
pub fn check_for_duplicates(
    directory: &Path,
    candidate_path: &Path,
    candidate_name: &OsStr,
) -> Result<Report> {
    Detector::default().check(directory, candidate_path, candidate_name)
}
