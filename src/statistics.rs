use serde::{Deserialize, Serialize};

/// Counters collected while checking a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    /// Directory members seen before the scan finished or stopped.
    pub entries_listed: usize,
    /// Members left out because they could not be resolved, read or hashed,
    /// or were not regular files.
    pub entries_skipped: usize,
    pub size_collision_groups: usize,
    pub partial_hashes: usize,
    pub partial_collision_groups: usize,
    pub full_hashes: usize,
}

impl DetectionStats {
    pub fn hashes_computed(&self) -> usize {
        self.partial_hashes + self.full_hashes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashes_computed() {
        let stats = DetectionStats {
            partial_hashes: 4,
            full_hashes: 2,
            ..DetectionStats::default()
        };
        assert_eq!(stats.hashes_computed(), 6);
        assert_eq!(DetectionStats::default().hashes_computed(), 0);
    }
}
