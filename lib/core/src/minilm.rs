//! Sentence embeddings from `all-MiniLM-L6-v2`
//!
//! The ONNX export of the model runs under ONNX Runtime. Token states are
//! mean-pooled over the attention mask and L2-normalized, which matches what
//! `sentence-transformers` produces for this model, so "car" lands near
//! "sedan" and "coupe" even without shared letters.

use crate::{Embedder, Error, Result, Vector};
use hf_hub::api::tokio::Api;
use ndarray::Array2;
use ort::{session::Session, value::Tensor};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};

pub const MINILM_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const MINILM_DIMENSION: usize = 384;

/// Sequence length the model was trained on
const MAX_TOKENS: usize = 256;

pub struct MiniLmEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl MiniLmEmbedder {
    /// Download (or reuse from the Hugging Face cache) the tokenizer and ONNX
    /// weights, then load them
    pub async fn fetch() -> Result<Self> {
        let api = Api::new().map_err(model_error)?;
        let repo = api.model(MINILM_REPO.to_string());

        tracing::info!(repo = MINILM_REPO, "fetching embedding model files");
        let tokenizer = repo.get("tokenizer.json").await.map_err(model_error)?;
        let model = repo.get("onnx/model.onnx").await.map_err(model_error)?;

        Self::from_files(&model, &tokenizer)
    }

    /// Load `model.onnx` and `tokenizer.json` from a local directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::from_files(&dir.join("model.onnx"), &dir.join("tokenizer.json"))
    }

    pub fn from_files(model: &Path, tokenizer: &Path) -> Result<Self> {
        let mut tokenizer = Tokenizer::from_file(tokenizer)
            .map_err(|e| Error::Embedding(format!("failed to load tokenizer: {}", e)))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(model_error)?;

        let session = Session::builder()
            .map_err(model_error)?
            .commit_from_file(model)
            .map_err(model_error)?;

        tracing::info!(model = %model.display(), "embedding model loaded");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl Embedder for MiniLmEmbedder {
    fn model_id(&self) -> &str {
        MINILM_REPO
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Embedding(format!("tokenization failed: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| x as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&x| x as i64).collect();
        let seq_len = input_ids.len();

        let inputs = HashMap::from([
            ("input_ids", tensor(input_ids, seq_len)?),
            ("attention_mask", tensor(attention_mask.clone(), seq_len)?),
            ("token_type_ids", tensor(token_type_ids, seq_len)?),
        ]);

        let mut session = self.session.lock();
        let outputs = session.run(inputs).map_err(model_error)?;
        let (shape, data) = outputs
            .get("last_hidden_state")
            .ok_or_else(|| Error::Embedding("model produced no last_hidden_state".to_string()))?
            .try_extract_tensor::<f32>()
            .map_err(model_error)?;

        let hidden_size = shape[2] as usize;
        if hidden_size != MINILM_DIMENSION {
            return Err(Error::DimensionMismatch {
                expected: MINILM_DIMENSION,
                actual: hidden_size,
            });
        }

        let mut vector = Vector::new(mean_pool(data, &attention_mask, hidden_size));
        vector.normalize();
        Ok(vector)
    }
}

fn tensor(values: Vec<i64>, seq_len: usize) -> Result<Tensor<i64>> {
    let array = Array2::from_shape_vec((1, seq_len), values).map_err(model_error)?;
    Tensor::from_array(array).map_err(model_error)
}

/// Average the token states whose mask is set
fn mean_pool(states: &[f32], mask: &[i64], hidden_size: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden_size];
    let mut counted = 0usize;

    for (token, row) in states.chunks_exact(hidden_size).enumerate() {
        if mask.get(token).copied().unwrap_or(0) == 0 {
            continue;
        }
        counted += 1;
        for (acc, &value) in pooled.iter_mut().zip(row) {
            *acc += value;
        }
    }

    if counted > 0 {
        for value in &mut pooled {
            *value /= counted as f32;
        }
    }
    pooled
}

fn model_error<E: Display>(e: E) -> Error {
    Error::Embedding(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_skips_padding() {
        let states = [1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&states, &[1, 1, 0], 2);
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn test_mean_pool_empty_mask() {
        assert_eq!(mean_pool(&[1.0, 1.0], &[0], 2), vec![0.0, 0.0]);
    }

    #[test]
    fn test_missing_files_fail() {
        let dir = std::env::temp_dir().join("trimsight-no-model");
        assert!(matches!(MiniLmEmbedder::from_dir(&dir), Err(Error::Embedding(_))));
    }

    #[tokio::test]
    #[ignore = "downloads model weights"]
    async fn test_semantic_neighbours() {
        let embedder = MiniLmEmbedder::fetch().await.unwrap();
        let query = embedder.embed("red car").unwrap();
        let coupe = embedder.embed("red coupe 2022").unwrap();
        let banana = embedder.embed("ripe yellow banana").unwrap();

        assert_eq!(query.dim(), MINILM_DIMENSION);
        assert!(query.cosine_similarity(&coupe) > query.cosine_similarity(&banana));
    }
}
