pub mod config;
pub mod detector;
pub mod hasher;
pub mod output;
pub mod report;
pub mod scanner;
pub mod statistics;

pub use config::DetectorConfig;
pub use detector::{Candidate, Detector, check_for_duplicates};
pub use hasher::{Algorithm, ContentHash, HashAlgorithm, StreamHasher};
pub use report::{Finding, Report, Verdict};
