//! # trimsight
//!
//! Retrieval-augmented question answering over a vehicle trim catalog.
//!
//! Each catalog row is rendered into a descriptive sentence and embedded once;
//! the vectors are cached on disk keyed by a fingerprint of the corpus. A
//! question is embedded the same way, the closest records are retrieved by
//! cosine similarity, and a generation service answers from them.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! trimsight --catalog data/cars.csv --cache data/vectors.bin "Which hybrid seats seven?"
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trimsight::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let embedder = Arc::new(HashingEmbedder::new());
//! let cache = EmbeddingCache::new("data/vectors.bin");
//! let index = build_index("data/cars.csv".as_ref(), &cache, embedder.as_ref())?;
//!
//! // Retrieval only, no generation service needed
//! let generator = GeminiGenerator::new(&GeneratorConfig {
//!     api_key: Some("key".to_string()),
//!     ..GeneratorConfig::default()
//! })?;
//! let pipeline = QueryPipeline::new(embedder, Arc::new(index), generator, PipelineConfig::default())?;
//! let evidence = pipeline.retrieve("red sedan", 3)?;
//! for hit in &evidence.hits {
//!     println!("{:.3} {}", hit.score, hit.hack_id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `trimsight-core` - Vector, embedder seam, exact cosine index, errors
//! - `trimsight-catalog` - CSV loading and text rendering
//! - `trimsight-storage` - Fingerprinted, atomically written embedding cache
//! - `trimsight-rag` - Query pipeline, prompt, generation adapter and retry policy

// Re-export core types
pub use trimsight_core::{
    Embedder, Error, HashingEmbedder, Result, RetrievalResult, RetrievedRecord, Vector,
    VectorIndex,
};

// Re-export catalog
pub use trimsight_catalog::{load_catalog, load_corpus, CarRecord, CatalogEntry};

// Re-export storage
pub use trimsight_storage::{CacheEntry, EmbeddingCache};

// Re-export the pipeline
pub use trimsight_rag::{
    build_index, Answer, CarLink, GeminiGenerator, Generator, GeneratorConfig, PipelineConfig,
    PromptTemplate, QueryPipeline, QueryState, RagConfig, RetryPolicy,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        build_index, Answer, EmbeddingCache, Embedder, Error, GeminiGenerator, Generator,
        GeneratorConfig, HashingEmbedder, PipelineConfig, QueryPipeline, RagConfig, Result,
        RetrievalResult, RetryPolicy, Vector, VectorIndex,
    };
}
