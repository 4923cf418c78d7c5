//! # trimsight Storage
//!
//! Persistent embedding cache. Vectors for the catalog are computed at most once
//! per corpus version: the cache stores a fingerprint of the embedder identity
//! and every rendered text, and a mismatch on load triggers a recompute.

pub mod cache;
pub mod fingerprint;
pub mod lock;

pub use cache::{CacheEntry, CacheHeader, EmbeddingCache, FORMAT_VERSION};
pub use fingerprint::corpus_fingerprint;
pub use lock::CacheLock;
