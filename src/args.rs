use anyhow::{Result, bail};
use clap::Parser;
use dupguard::config::{DEFAULT_PARTIAL_HASH_SIZE, DEFAULT_READ_CHUNK_SIZE, DetectorConfig};
use dupguard::hasher::Algorithm;
use log::LevelFilter;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    version,
    about = "Check a directory for duplicates of a file before copying it",
    long_about = "Check a directory for a file with the same name or the same content \
                  as an incoming file, comparing sizes first and hashing only what can collide"
)]
pub struct Args {
    /// Directory the file would be copied into
    pub directory: PathBuf,

    /// File to check
    pub candidate: PathBuf,

    /// Name the file would be stored under (defaults to the candidate's file name)
    #[arg(short, long)]
    pub name: Option<OsString>,

    /// Digest used for partial and full hashing
    #[arg(short, long, value_enum, default_value_t = Algorithm::Blake3)]
    pub algorithm: Algorithm,

    /// Bytes hashed from the start of each file before full hashing
    #[arg(long, default_value_t = DEFAULT_PARTIAL_HASH_SIZE)]
    pub partial_size: u64,

    /// Read buffer size in bytes
    #[arg(long, default_value_t = DEFAULT_READ_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Hash the files of each group in parallel
    #[arg(short, long)]
    pub parallel: bool,

    /// Maximum number of threads when hashing in parallel (0 = auto)
    #[arg(long, default_value = "0")]
    pub threads: usize,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(short, long, default_value = "warn")]
    pub log_level: LevelFilter,

    /// Output the report to a JSON file
    #[arg(short, long)]
    pub output_json: Option<PathBuf>,
}

impl Args {
    pub fn candidate_name(&self) -> Result<OsString> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        match self.candidate.file_name() {
            Some(name) => Ok(name.to_os_string()),
            None => bail!(
                "Cannot take a file name from {}, pass --name",
                self.candidate.display()
            ),
        }
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            hash_algorithm: Arc::new(self.algorithm),
            partial_hash_size: self.partial_size,
            read_chunk_size: self.chunk_size,
            parallel: self.parallel,
        }
    }
}
