use crate::prompt::PromptTemplate;
use crate::retry::RetryPolicy;
use std::time::Duration;
use trimsight_core::{Error, Result};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings owned by the query pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Records retrieved per question
    pub top_k: usize,
    pub prompt: PromptTemplate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            prompt: PromptTemplate::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be positive".to_string()));
        }
        Ok(())
    }
}

/// Settings for the generation service. External to the core: the pipeline
/// never reads them, only the adapter does.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Per-request timeout, applied to every attempt
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig("generation endpoint is empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(Error::InvalidConfig("generation model is empty".to_string()));
        }
        if self.api_key.as_deref().map_or(true, |key| key.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "missing API key for the generation service".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RagConfig {
    pub pipeline: PipelineConfig,
    pub generator: GeneratorConfig,
}

impl RagConfig {
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        self.generator.validate()
    }
}
