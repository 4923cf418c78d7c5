//! # trimsight RAG
//!
//! Answers natural-language questions about the vehicle catalog: the
//! question is embedded, the nearest catalog records are retrieved, and a
//! generation service writes an answer grounded on them.
//!
//! - [`startup::build_index`] - catalog + cache + embedder into a [`trimsight_core::VectorIndex`]
//! - [`QueryPipeline`] - the per-question state machine
//! - [`Generator`] / [`GeminiGenerator`] - the generation boundary and its HTTP adapter
//! - [`RetryPolicy`] - backoff configuration owned by the adapter
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trimsight_core::HashingEmbedder;
//! use trimsight_rag::{build_index, GeminiGenerator, QueryPipeline, RagConfig};
//! use trimsight_storage::EmbeddingCache;
//!
//! # async fn run() -> trimsight_core::Result<()> {
//! let embedder = Arc::new(HashingEmbedder::new());
//! let cache = EmbeddingCache::new("data/vectors.bin");
//! let index = build_index("data/cars.csv".as_ref(), &cache, embedder.as_ref())?;
//!
//! let mut config = RagConfig::default();
//! config.generator.api_key = std::env::var("GEMINI_API_KEY").ok();
//!
//! let generator = GeminiGenerator::new(&config.generator)?;
//! let pipeline = QueryPipeline::new(embedder, Arc::new(index), generator, config.pipeline)?;
//! let answer = pipeline.query("Which hybrid sedan has the best mileage?").await?;
//! println!("{}", answer.answer);
//! # Ok(())
//! # }
//! ```

pub mod answer;
pub mod config;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod retry;
pub mod startup;

pub use answer::{Answer, CarLink};
pub use config::{GeneratorConfig, PipelineConfig, RagConfig, DEFAULT_TOP_K};
pub use generator::{GeminiGenerator, Generator};
pub use pipeline::{QueryPipeline, QueryState};
pub use prompt::PromptTemplate;
pub use retry::{AttemptError, RetryPolicy};
pub use startup::build_index;
