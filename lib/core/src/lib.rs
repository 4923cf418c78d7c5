//! # trimsight Core
//!
//! Core library for trimsight.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`Vector`] - Dense embedding vector with cosine helpers
//! - [`Embedder`] - Text-to-vector seam, with the deterministic [`HashingEmbedder`]
//!   and, with the `onnx` feature, the `all-MiniLM-L6-v2` sentence model
//! - [`VectorIndex`] - Exact cosine nearest-neighbor index over the corpus
//! - [`Error`] - The error taxonomy shared by every trimsight crate
//!
//! ## Example
//!
//! ```rust
//! use trimsight_core::{Embedder, HashingEmbedder, VectorIndex};
//!
//! let embedder = HashingEmbedder::new();
//! let texts = vec!["red sedan 2020".to_string(), "blue truck 2021".to_string()];
//! let vectors = embedder.embed_many(&texts).unwrap();
//! let ids = vec!["a".to_string(), "b".to_string()];
//!
//! let index = VectorIndex::build(ids, vectors, texts).unwrap();
//! let query = embedder.embed("red car").unwrap();
//! let result = index.search(&query, 1).unwrap();
//! assert_eq!(result.hits[0].hack_id, "a");
//! ```

pub mod embedder;
pub mod error;
pub mod index;
#[cfg(feature = "onnx")]
pub mod minilm;
pub mod vector;

pub use embedder::{Embedder, HashingEmbedder, DEFAULT_DIMENSION};
pub use error::{Error, Result};
pub use index::{RetrievalResult, RetrievedRecord, VectorIndex};
#[cfg(feature = "onnx")]
pub use minilm::MiniLmEmbedder;
pub use vector::Vector;
