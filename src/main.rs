use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use trimsight_core::{Embedder, HashingEmbedder, DEFAULT_DIMENSION};
use trimsight_rag::config::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TOP_K};
use trimsight_rag::{
    build_index, GeminiGenerator, GeneratorConfig, PipelineConfig, PromptTemplate, QueryPipeline,
    RagConfig, RetryPolicy,
};
use trimsight_storage::EmbeddingCache;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum EmbedderKind {
    /// Offline trigram hashing
    #[cfg_attr(not(feature = "onnx"), default)]
    Hashing,
    /// all-MiniLM-L6-v2 sentence embeddings (needs the `onnx` feature)
    #[cfg_attr(feature = "onnx", default)]
    Minilm,
}

/// Ask questions about the vehicle catalog
#[derive(Parser, Debug)]
#[command(name = "trimsight")]
#[command(about = "Retrieval-augmented answers over a vehicle trim catalog", long_about = None)]
struct Args {
    /// Processed catalog CSV
    #[arg(long, default_value = "./data/cars.csv")]
    catalog: PathBuf,

    /// Embedding cache artifact
    #[arg(long, default_value = "./data/vectors.bin")]
    cache: PathBuf,

    /// Records retrieved per question
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Generation model
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// API key for the generation service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Generation service base URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Attempts per generation call, including the first
    #[arg(long, default_value_t = 3)]
    retry_attempts: u32,

    /// Backoff before the first retry, doubled on each further retry
    #[arg(long, default_value_t = 500)]
    retry_base_delay_ms: u64,

    /// Embedding model
    #[arg(long, value_enum, default_value_t = EmbedderKind::default())]
    embedder: EmbedderKind,

    /// Directory holding model.onnx and tokenizer.json; downloaded when omitted
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Dimension of the hashing embedder
    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    dimension: usize,

    /// Discard the embedding cache and recompute it
    #[arg(long)]
    rebuild: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Question to answer; questions are read line by line from stdin when omitted
    question: Option<String>,
}

impl Args {
    fn rag_config(&self) -> RagConfig {
        RagConfig {
            pipeline: PipelineConfig {
                top_k: self.top_k,
                prompt: PromptTemplate::default(),
            },
            generator: GeneratorConfig {
                endpoint: self.endpoint.clone(),
                model: self.model.clone(),
                api_key: self.api_key.clone(),
                timeout: Duration::from_secs(self.timeout_secs),
                retry: RetryPolicy::new(
                    self.retry_attempts,
                    Duration::from_millis(self.retry_base_delay_ms),
                ),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting trimsight v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("Embedding cache: {:?}", args.cache);

    let config = args.rag_config();
    config.validate()?;

    let embedder: Arc<dyn Embedder> = match args.embedder {
        EmbedderKind::Hashing => Arc::new(HashingEmbedder::with_dimension(args.dimension)?),
        EmbedderKind::Minilm => load_minilm(args.model_dir.as_deref()).await?,
    };
    info!("Embedder: {}", embedder.model_id());
    let cache = EmbeddingCache::new(&args.cache);
    if args.rebuild && cache.invalidate()? {
        info!("Embedding cache discarded, recomputing");
    }

    let index = {
        let embedder = embedder.clone();
        let catalog = args.catalog.clone();
        tokio::task::spawn_blocking(move || build_index(&catalog, &cache, embedder.as_ref()))
            .await??
    };
    info!("Index ready with {} records", index.len());

    let generator = GeminiGenerator::new(&config.generator)?;
    let pipeline = QueryPipeline::new(embedder, Arc::new(index), generator, config.pipeline)?;

    if let Some(question) = args.question.as_deref() {
        let answer = pipeline.query(question).await?;
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match pipeline.query(&line).await {
            Ok(answer) => println!("{}", serde_json::to_string_pretty(&answer)?),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    info!("Shutting down...");
    Ok(())
}

#[cfg(feature = "onnx")]
async fn load_minilm(dir: Option<&Path>) -> anyhow::Result<Arc<dyn Embedder>> {
    use trimsight_core::MiniLmEmbedder;

    let embedder = match dir {
        Some(dir) => MiniLmEmbedder::from_dir(dir)?,
        None => MiniLmEmbedder::fetch().await?,
    };
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "onnx"))]
async fn load_minilm(_dir: Option<&Path>) -> anyhow::Result<Arc<dyn Embedder>> {
    anyhow::bail!("the minilm embedder requires building with `--features onnx`")
}
