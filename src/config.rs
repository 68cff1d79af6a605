use anyhow::{Result, bail};
use std::fmt;
use std::sync::Arc;

use crate::hasher::{Algorithm, HashAlgorithm};

/// Bytes hashed from the start of each file in the partial hash stage.
pub const DEFAULT_PARTIAL_HASH_SIZE: u64 = 1024;
/// Read buffer size for streaming a file through the digest.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone)]
pub struct DetectorConfig {
    pub hash_algorithm: Arc<dyn HashAlgorithm>,
    pub partial_hash_size: u64,
    pub read_chunk_size: usize,
    /// Hash the members of each bucket on the rayon pool.
    pub parallel: bool,
}

impl DetectorConfig {
    pub fn with_algorithm(algorithm: impl HashAlgorithm + 'static) -> Self {
        Self {
            hash_algorithm: Arc::new(algorithm),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.partial_hash_size == 0 {
            bail!("Partial hash size must be greater than zero");
        }
        if self.read_chunk_size == 0 {
            bail!("Read chunk size must be greater than zero");
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: Arc::new(Algorithm::default()),
            partial_hash_size: DEFAULT_PARTIAL_HASH_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            parallel: false,
        }
    }
}

impl fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("hash_algorithm", &self.hash_algorithm.name())
            .field("partial_hash_size", &self.partial_hash_size)
            .field("read_chunk_size", &self.read_chunk_size)
            .field("parallel", &self.parallel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.hash_algorithm.name(), "blake3");
        assert_eq!(config.partial_hash_size, 1024);
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_algorithm() {
        let config = DetectorConfig::with_algorithm(Algorithm::Sha1);
        assert_eq!(config.hash_algorithm.name(), "sha1");
        assert_eq!(config.read_chunk_size, DEFAULT_READ_CHUNK_SIZE);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let config = DetectorConfig {
            partial_hash_size: 0,
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DetectorConfig {
            read_chunk_size: 0,
            ..DetectorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chunk size"));
    }
}
