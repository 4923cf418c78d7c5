//! Persistent embedding cache
//!
//! The artifact is a single file:
//!
//! ```text
//! | magic "TSEMBC1\0" (8) | SHA-256 of payload (32) | bincode(CacheEntry) |
//! ```
//!
//! Writes go through `atomicwrites` (temp file in the same directory, then
//! rename) while an exclusive lock is held on `<path>.lock`. Anything that does
//! not decode and validate is reported as absent, which triggers a recompute.

use crate::fingerprint::corpus_fingerprint;
use crate::lock::CacheLock;
use atomicwrites::{AllowOverwrite, AtomicFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use trimsight_catalog::{render_corpus, CarRecord};
use trimsight_core::{Embedder, Error, Result, Vector, VectorIndex};

const MAGIC: &[u8; 8] = b"TSEMBC1\0";
const CHECKSUM_LEN: usize = 32;

/// Bumped whenever the on-disk layout changes
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheHeader {
    pub format_version: u32,
    pub model_id: String,
    pub dimension: usize,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// Texts, vectors and ids of the whole corpus, index-aligned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub header: CacheHeader,
    pub texts: Vec<String>,
    pub vectors: Vec<Vector>,
    pub hack_ids: Vec<String>,
}

impl CacheEntry {
    pub fn new(
        model_id: &str,
        dimension: usize,
        hack_ids: Vec<String>,
        texts: Vec<String>,
        vectors: Vec<Vector>,
    ) -> Result<Self> {
        let entry = Self {
            header: CacheHeader {
                format_version: FORMAT_VERSION,
                model_id: model_id.to_string(),
                dimension,
                fingerprint: corpus_fingerprint(model_id, dimension, &hack_ids, &texts),
                created_at: Utc::now(),
            },
            texts,
            vectors,
            hack_ids,
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn len(&self) -> usize {
        self.hack_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hack_ids.is_empty()
    }

    /// Check the invariants a loaded entry must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.header.format_version != FORMAT_VERSION {
            return Err(Error::Persistence(format!(
                "unsupported format version {}",
                self.header.format_version
            )));
        }
        if self.texts.len() != self.vectors.len() || self.texts.len() != self.hack_ids.len() {
            return Err(Error::Persistence(format!(
                "parallel lists differ in length: {} texts, {} vectors, {} ids",
                self.texts.len(),
                self.vectors.len(),
                self.hack_ids.len()
            )));
        }
        if let Some(vector) = self.vectors.iter().find(|v| v.dim() != self.header.dimension) {
            return Err(Error::DimensionMismatch {
                expected: self.header.dimension,
                actual: vector.dim(),
            });
        }
        let expected = corpus_fingerprint(
            &self.header.model_id,
            self.header.dimension,
            &self.hack_ids,
            &self.texts,
        );
        if expected != self.header.fingerprint {
            return Err(Error::Persistence("fingerprint does not match contents".to_string()));
        }
        Ok(())
    }

    /// Build the in-memory index over this entry
    pub fn into_index(self) -> Result<VectorIndex> {
        VectorIndex::build(self.hack_ids, self.vectors, self.texts)
    }
}

/// File-backed cache of corpus embeddings
pub struct EmbeddingCache {
    path: PathBuf,
    lock_path: PathBuf,
}

impl EmbeddingCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut lock_name = path.as_os_str().to_os_string();
        lock_name.push(".lock");

        Self {
            path,
            lock_path: PathBuf::from(lock_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the artifact. A missing, unreadable or invalid artifact yields `None`.
    pub fn load(&self) -> Result<Option<CacheEntry>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "embedding cache unreadable, treating as absent");
                return Ok(None);
            }
        };

        match decode(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unusable embedding cache");
                Ok(None)
            }
        }
    }

    /// Replace the artifact with `entry` in one atomic swap
    pub fn store(&self, entry: &CacheEntry) -> Result<()> {
        entry.validate()?;
        let bytes = encode(entry)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let _lock = CacheLock::acquire(&self.lock_path)?;
        AtomicFile::new(&self.path, AllowOverwrite)
            .write(|f| f.write_all(&bytes))
            .map_err(|e| Error::Persistence(format!("failed to write {}: {}", self.path.display(), e)))?;

        tracing::info!(
            path = %self.path.display(),
            entries = entry.len(),
            bytes = bytes.len(),
            "embedding cache stored"
        );
        Ok(())
    }

    /// Return the cached entry for `records`, embedding and storing it on a miss.
    ///
    /// A cached entry is reused only when its fingerprint matches the current
    /// corpus and embedder.
    pub fn build_or_load<E: Embedder + ?Sized>(
        &self,
        records: &[CarRecord],
        embedder: &E,
    ) -> Result<CacheEntry> {
        let (hack_ids, texts): (Vec<String>, Vec<String>) = render_corpus(records)
            .into_iter()
            .map(|entry| (entry.hack_id, entry.text))
            .unzip();
        let fingerprint =
            corpus_fingerprint(embedder.model_id(), embedder.dimension(), &hack_ids, &texts);

        match self.load()? {
            Some(entry) if entry.header.fingerprint == fingerprint => {
                tracing::info!(entries = entry.len(), "loaded pre-computed vectors");
                return Ok(entry);
            }
            Some(entry) => {
                tracing::info!(
                    cached_model = %entry.header.model_id,
                    "embedding cache is stale, recomputing"
                );
            }
            None => {
                tracing::info!(entries = texts.len(), "computing vectors for the first time");
            }
        }

        let vectors = embedder.embed_many(&texts)?;
        if vectors.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }

        let entry = CacheEntry::new(
            embedder.model_id(),
            embedder.dimension(),
            hack_ids,
            texts,
            vectors,
        )?;
        self.store(&entry)?;
        Ok(entry)
    }

    /// Delete the artifact. Returns whether one existed.
    pub fn invalidate(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "embedding cache removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn encode(entry: &CacheEntry) -> Result<Vec<u8>> {
    let payload = bincode::serialize(entry).map_err(|e| Error::Serialization(e.to_string()))?;
    let checksum = Sha256::digest(&payload);

    let mut bytes = Vec::with_capacity(MAGIC.len() + CHECKSUM_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&checksum);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn decode(bytes: &[u8]) -> Result<CacheEntry> {
    let header_len = MAGIC.len() + CHECKSUM_LEN;
    if bytes.len() < header_len || &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::Persistence("not an embedding cache".to_string()));
    }

    let (checksum, payload) = bytes[MAGIC.len()..].split_at(CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(Error::Persistence("checksum mismatch".to_string()));
    }

    let entry: CacheEntry =
        bincode::deserialize(payload).map_err(|e| Error::Serialization(e.to_string()))?;
    entry.validate()?;
    Ok(entry)
}
