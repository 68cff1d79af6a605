use anyhow::Result;
use clap::ValueEnum;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::config::DetectorConfig;
use crate::report::Finding;
use crate::scanner::{FileEntry, SizeBuckets};
use crate::statistics::DetectionStats;

/// Digest bytes produced by a [`HashAlgorithm`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash(Vec<u8>);

impl ContentHash {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Incremental digest state for one file.
pub trait StreamHasher {
    fn update(&mut self, bytes: &[u8]);
    fn finish(self: Box<Self>) -> ContentHash;
}

/// Digest function used for both partial and full hashing.
pub trait HashAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;
    fn start(&self) -> Box<dyn StreamHasher>;
}

impl StreamHasher for blake3::Hasher {
    fn update(&mut self, bytes: &[u8]) {
        blake3::Hasher::update(self, bytes);
    }

    fn finish(self: Box<Self>) -> ContentHash {
        ContentHash::from_bytes(self.finalize().as_bytes().to_vec())
    }
}

struct DigestHasher<D>(D);

impl<D: Digest> StreamHasher for DigestHasher<D> {
    fn update(&mut self, bytes: &[u8]) {
        Digest::update(&mut self.0, bytes);
    }

    fn finish(self: Box<Self>) -> ContentHash {
        let DigestHasher(digest) = *self;
        ContentHash::from_bytes(digest.finalize().to_vec())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// BLAKE3, 256-bit
    #[default]
    Blake3,
    /// SHA-1, 160-bit
    Sha1,
    /// SHA-256, 256-bit
    Sha256,
}

impl HashAlgorithm for Algorithm {
    fn name(&self) -> &'static str {
        match self {
            Algorithm::Blake3 => "blake3",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha256 => "sha256",
        }
    }

    fn start(&self) -> Box<dyn StreamHasher> {
        match self {
            Algorithm::Blake3 => Box::new(blake3::Hasher::new()),
            Algorithm::Sha1 => Box::new(DigestHasher(Sha1::new())),
            Algorithm::Sha256 => Box::new(DigestHasher(Sha256::new())),
        }
    }
}

fn stream_into<R: Read>(
    mut reader: R,
    hasher: &mut dyn StreamHasher,
    chunk_size: usize,
) -> io::Result<u64> {
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
        total += read as u64;
    }
}

/// Hashes the first `limit` bytes of a file, or all of it when shorter.
pub fn partial_hash_file(
    path: &Path,
    algorithm: &dyn HashAlgorithm,
    limit: u64,
    chunk_size: usize,
) -> Result<ContentHash> {
    let file = File::open(path)?;
    let chunk_size = chunk_size.min(usize::try_from(limit).unwrap_or(usize::MAX));
    let mut state = algorithm.start();
    stream_into(file.take(limit), state.as_mut(), chunk_size)?;
    Ok(state.finish())
}

/// Hashes a whole file, reading at most `chunk_size` bytes at a time.
pub fn full_hash_file(
    path: &Path,
    algorithm: &dyn HashAlgorithm,
    chunk_size: usize,
) -> Result<ContentHash> {
    let file = File::open(path)?;
    let mut state = algorithm.start();
    stream_into(file, state.as_mut(), chunk_size)?;
    Ok(state.finish())
}

/// Hashes every member, in member order. A failed member yields `None`
/// and is left for the caller to drop.
fn hash_members<'e, F>(
    members: &'e [FileEntry],
    parallel: bool,
    hash: F,
) -> Vec<(&'e FileEntry, Option<ContentHash>)>
where
    F: Fn(&Path) -> Result<ContentHash> + Sync,
{
    let hash_one = |entry: &'e FileEntry| match hash(&entry.path) {
        Ok(digest) => (entry, Some(digest)),
        Err(e) => {
            debug!("Skipping {}: {:#}", entry.path.display(), e);
            (entry, None)
        }
    };

    if parallel {
        members.par_iter().map(hash_one).collect()
    } else {
        members.iter().map(hash_one).collect()
    }
}

/// Splits every size collision group by the hash of its leading bytes and
/// returns the groups that still hold two or more members.
pub fn partial_hash_buckets(
    size_buckets: &SizeBuckets,
    config: &DetectorConfig,
    stats: &mut DetectionStats,
) -> Vec<Vec<FileEntry>> {
    let algorithm = config.hash_algorithm.as_ref();
    let mut survivors = Vec::new();

    for (size, members) in size_buckets.collisions() {
        let hashed = hash_members(members, config.parallel, |path| {
            partial_hash_file(
                path,
                algorithm,
                config.partial_hash_size,
                config.read_chunk_size,
            )
        });

        let mut buckets: BTreeMap<ContentHash, Vec<FileEntry>> = BTreeMap::new();
        for (entry, digest) in hashed {
            stats.partial_hashes += 1;
            match digest {
                Some(digest) => buckets.entry(digest).or_default().push(entry.clone()),
                None => stats.entries_skipped += 1,
            }
        }

        let before = survivors.len();
        survivors.extend(buckets.into_values().filter(|bucket| bucket.len() >= 2));
        debug!(
            "Size {}: {} members, {} partial hash collision groups",
            size,
            members.len(),
            survivors.len() - before
        );
    }

    stats.partial_collision_groups = survivors.len();
    survivors
}

/// Hashes each member of the partial collision groups in full and reports
/// every file whose digest was already seen, paired with the first holder.
pub fn find_full_hash_duplicates(
    groups: &[Vec<FileEntry>],
    config: &DetectorConfig,
    stats: &mut DetectionStats,
) -> Vec<Finding> {
    let algorithm = config.hash_algorithm.as_ref();
    let mut first_seen: HashMap<ContentHash, PathBuf> = HashMap::new();
    let mut findings = Vec::new();

    for members in groups {
        let hashed = hash_members(members, config.parallel, |path| {
            full_hash_file(path, algorithm, config.read_chunk_size)
        });

        for (entry, digest) in hashed {
            stats.full_hashes += 1;
            let Some(digest) = digest else {
                stats.entries_skipped += 1;
                continue;
            };
            match first_seen.entry(digest) {
                Entry::Occupied(existing) => {
                    debug!(
                        "{} has the same content as {}",
                        entry.path.display(),
                        existing.get().display()
                    );
                    findings.push(Finding::ContentDuplicate {
                        new_path: entry.path.clone(),
                        existing_path: existing.get().clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry.path.clone());
                }
            }
        }
    }

    findings
}
