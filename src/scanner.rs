use anyhow::{Context, Result, bail};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::statistics::DetectionStats;

/// A regular file, addressed by its resolved path, with the size read once
/// at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

impl FileEntry {
    /// Follows symlinks to the real path and reads the size of the target.
    pub fn resolve(path: &Path) -> Result<Self> {
        let resolved = fs::canonicalize(path)
            .with_context(|| format!("Cannot resolve {}", path.display()))?;
        let metadata = fs::metadata(&resolved)
            .with_context(|| format!("Cannot read metadata for {}", resolved.display()))?;
        if !metadata.is_file() {
            bail!("Not a regular file: {}", resolved.display());
        }
        Ok(Self {
            path: resolved,
            size: metadata.len(),
        })
    }
}

/// Checks that the target directory exists before anything is listed.
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.exists() {
        bail!("Target directory does not exist: {}", dir.display());
    }
    if !dir.is_dir() {
        bail!("Target is not a directory: {}", dir.display());
    }
    Ok(())
}

/// Result of listing the target directory.
#[derive(Debug, PartialEq, Eq)]
pub enum Listing {
    /// An entry already carries the candidate's name; listing stopped there.
    NameCollision(String),
    Entries(Vec<FileEntry>),
}

/// Lists the direct members of `dir` in file name order.
///
/// Stops at the first member named `candidate_name`. Members that cannot be
/// resolved or are not regular files are counted as skipped and left out.
/// Failing to read `dir` itself is an error.
pub fn scan_directory(
    dir: &Path,
    candidate_name: &OsStr,
    stats: &mut DetectionStats,
) -> Result<Listing> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut entries = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("Failed to list {}", dir.display()));
            }
            Err(e) => {
                debug!("Error reading directory entry: {}", e);
                stats.entries_skipped += 1;
                continue;
            }
        };

        stats.entries_listed += 1;

        if entry.file_name() == candidate_name {
            return Ok(Listing::NameCollision(
                entry.file_name().to_string_lossy().into_owned(),
            ));
        }

        match FileEntry::resolve(entry.path()) {
            Ok(file) => entries.push(file),
            Err(e) => {
                debug!("Skipping {}: {:#}", entry.path().display(), e);
                stats.entries_skipped += 1;
            }
        }
    }

    Ok(Listing::Entries(entries))
}

/// Files grouped by byte size. Members keep their insertion order.
#[derive(Debug, Default)]
pub struct SizeBuckets {
    buckets: BTreeMap<u64, Vec<FileEntry>>,
}

impl SizeBuckets {
    /// Starts with the candidate alone in its size bucket, so any file of the
    /// same size later forms a collision group with it.
    pub fn seeded(candidate: FileEntry) -> Self {
        let mut buckets = Self::default();
        buckets.insert(candidate);
        buckets
    }

    pub fn insert(&mut self, entry: FileEntry) {
        self.buckets.entry(entry.size).or_default().push(entry);
    }

    /// Buckets holding at least two files, in ascending size order.
    pub fn collisions(&self) -> impl Iterator<Item = (u64, &[FileEntry])> {
        self.buckets
            .iter()
            .filter(|(_, files)| files.len() >= 2)
            .map(|(size, files)| (*size, files.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Buckets the scanned files by size behind the candidate. A file whose
/// resolved path is already in the pool is dropped.
pub fn group_by_size(
    candidate: FileEntry,
    files: Vec<FileEntry>,
    stats: &mut DetectionStats,
) -> SizeBuckets {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    seen.insert(candidate.path.clone());
    let mut buckets = SizeBuckets::seeded(candidate);

    for file in files {
        if !seen.insert(file.path.clone()) {
            debug!("{} is already in the pool, skipping", file.path.display());
            stats.entries_skipped += 1;
            continue;
        }
        buckets.insert(file);
    }

    stats.size_collision_groups = buckets.collisions().count();
    buckets
}
