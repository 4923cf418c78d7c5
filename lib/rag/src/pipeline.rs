//! Query pipeline
//!
//! One question flows through a fixed sequence of states:
//!
//! ```text
//! Received -> Embedding -> Searching -> Prompting -> Generating -> Complete
//! ```
//!
//! Any step may end the query in `Failed`. The pipeline holds only shared,
//! read-only parts, so any number of queries can run concurrently.

use crate::answer::Answer;
use crate::config::PipelineConfig;
use crate::generator::Generator;
use crate::prompt::PromptTemplate;
use std::fmt;
use std::sync::Arc;
use trimsight_core::{Embedder, Error, Result, RetrievalResult, VectorIndex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Received,
    Embedding,
    Searching,
    Prompting,
    Generating,
    Complete,
    Failed,
}

impl QueryState {
    /// The state that follows on success, `None` for terminal states
    pub fn next(self) -> Option<QueryState> {
        match self {
            QueryState::Received => Some(QueryState::Embedding),
            QueryState::Embedding => Some(QueryState::Searching),
            QueryState::Searching => Some(QueryState::Prompting),
            QueryState::Prompting => Some(QueryState::Generating),
            QueryState::Generating => Some(QueryState::Complete),
            QueryState::Complete | QueryState::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryState::Received => "received",
            QueryState::Embedding => "embedding",
            QueryState::Searching => "searching",
            QueryState::Prompting => "prompting",
            QueryState::Generating => "generating",
            QueryState::Complete => "complete",
            QueryState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-query state machine. Only forward transitions along
/// [`QueryState::next`] or into `Failed` are taken.
struct QueryRun {
    id: Uuid,
    state: QueryState,
}

impl QueryRun {
    fn start() -> Self {
        let run = Self {
            id: Uuid::new_v4(),
            state: QueryState::Received,
        };
        tracing::debug!(query_id = %run.id, state = %run.state, "query state");
        run
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next() {
            self.state = next;
            tracing::debug!(query_id = %self.id, state = %self.state, "query state");
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        tracing::warn!(query_id = %self.id, from = %self.state, error = %error, "query failed");
        self.state = QueryState::Failed;
        error
    }
}

pub struct QueryPipeline<E: Embedder + ?Sized, G: Generator> {
    embedder: Arc<E>,
    index: Arc<VectorIndex>,
    generator: G,
    config: PipelineConfig,
}

impl<E: Embedder + ?Sized, G: Generator> QueryPipeline<E, G> {
    pub fn new(
        embedder: Arc<E>,
        index: Arc<VectorIndex>,
        generator: G,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        if embedder.dimension() != index.dimension() {
            return Err(Error::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dimension(),
            });
        }

        Ok(Self {
            embedder,
            index,
            generator,
            config,
        })
    }

    /// Retrieve the `k` records closest to `question` without generating
    pub fn retrieve(&self, question: &str, k: usize) -> Result<RetrievalResult> {
        let question = non_empty(question)?;
        let query = self.embedder.embed(question)?;
        self.index.search(&query, k)
    }

    /// Answer `question` from the `top_k` most similar catalog records.
    ///
    /// Empty questions are rejected before any embedding or generation work.
    /// A generation failure fails the whole query; there is no partial answer
    /// and no retry at this level.
    pub async fn query(&self, question: &str) -> Result<Answer> {
        let mut run = QueryRun::start();

        let question = non_empty(question).map_err(|e| run.fail(e))?;

        run.advance();
        let query = self.embedder.embed(question).map_err(|e| run.fail(e))?;

        run.advance();
        let retrieval = self
            .index
            .search(&query, self.config.top_k)
            .map_err(|e| run.fail(e))?;

        run.advance();
        let context = PromptTemplate::context(&retrieval);
        let prompt = self.config.prompt.render(&context, question);

        run.advance();
        let text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| match e {
                Error::Generation(_) => e,
                other => Error::Generation(other.to_string()),
            })
            .map_err(|e| run.fail(e))?;

        run.advance();
        tracing::info!(query_id = %run.id, retrieved = retrieval.len(), "query answered");
        Ok(Answer::from_retrieval(text, &retrieval))
    }
}

fn non_empty(question: &str) -> Result<&str> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("question is empty".to_string()));
    }
    Ok(trimmed)
}
