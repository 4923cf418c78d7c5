//! Text embedders
//!
//! [`Embedder`] is the seam between rendered catalog text and the vector index.
//! [`HashingEmbedder`] is the built-in implementation: character trigrams and
//! words are hashed into a fixed number of buckets and the result is
//! L2-normalized. It needs no model weights and is fully deterministic, so the
//! same text always produces bit-identical vectors.

use crate::{Error, Result, Vector};
use rayon::prelude::*;
use sha2::{Digest, Sha256};

/// Default embedding dimension, matching all-MiniLM-L6-v2 sized vectors
pub const DEFAULT_DIMENSION: usize = 384;

const TRIGRAM_WEIGHT: f32 = 1.0;
const WORD_WEIGHT: f32 = 2.0;

/// Maps text to fixed-length dense vectors.
///
/// Implementations hold only immutable state after construction; `embed` must
/// be callable concurrently from many queries.
pub trait Embedder: Send + Sync {
    /// Identifier of the model and its version. Part of the cache fingerprint.
    fn model_id(&self) -> &str;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vector>;

    /// Embed a batch, preserving input order
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Feature-hashing embedder over character trigrams and words
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            model_id: format!("hashing-trigram-v1/{}", DEFAULT_DIMENSION),
        }
    }

    pub fn with_dimension(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidConfig(
                "embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            model_id: format!("hashing-trigram-v1/{}", dimension),
        })
    }

    fn bucket(&self, feature: &str) -> usize {
        let digest = Sha256::digest(feature.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(prefix) % self.dimension as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        let normalized = text.to_lowercase();
        let mut components = vec![0.0f32; self.dimension];

        for trigram in trigrams(&normalized) {
            let pos = self.bucket(&format!("t:{}", trigram));
            components[pos] += TRIGRAM_WEIGHT;
        }

        for word in words(&normalized) {
            let pos = self.bucket(&format!("w:{}", word));
            components[pos] += WORD_WEIGHT;
        }

        let mut vector = Vector::new(components);
        vector.normalize();
        Ok(vector)
    }

    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        tracing::debug!(count = texts.len(), model = %self.model_id, "embedding batch");
        texts.par_iter().map(|text| self.embed(text)).collect()
    }
}

/// Character trigrams of a space-padded string, in order of appearance
fn trigrams(s: &str) -> Vec<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();

    chars.windows(3).map(|w| w.iter().collect::<String>()).collect()
}

fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}
