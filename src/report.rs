use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::statistics::DetectionStats;

/// A single conflict found for the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// A directory entry already has the candidate's name.
    NameCollision {
        existing_name: String,
        candidate_name: String,
    },
    /// `new_path` has the same full hash as `existing_path`, which was hashed first.
    ContentDuplicate {
        new_path: PathBuf,
        existing_path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    NameCollision,
    ContentDuplicate,
    NoDuplicate,
}

/// Outcome of one check. Holds either a single [`Finding::NameCollision`]
/// or zero or more [`Finding::ContentDuplicate`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub candidate: PathBuf,
    pub algorithm: String,
    pub findings: Vec<Finding>,
    pub stats: DetectionStats,
}

impl Report {
    pub fn new(candidate: PathBuf, algorithm: impl Into<String>) -> Self {
        Self {
            candidate,
            algorithm: algorithm.into(),
            findings: Vec::new(),
            stats: DetectionStats::default(),
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self.findings.first() {
            Some(Finding::NameCollision { .. }) => Verdict::NameCollision,
            Some(Finding::ContentDuplicate { .. }) => Verdict::ContentDuplicate,
            None => Verdict::NoDuplicate,
        }
    }

    pub fn is_unique(&self) -> bool {
        self.findings.is_empty()
    }

    /// Existing files whose content matches the candidate.
    pub fn candidate_duplicates(&self) -> Vec<&Path> {
        self.findings
            .iter()
            .filter_map(|finding| match finding {
                Finding::ContentDuplicate {
                    new_path,
                    existing_path,
                } if existing_path == &self.candidate => Some(new_path.as_path()),
                Finding::ContentDuplicate {
                    new_path,
                    existing_path,
                } if new_path == &self.candidate => Some(existing_path.as_path()),
                _ => None,
            })
            .collect()
    }
}
