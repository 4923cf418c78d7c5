// Integration tests for trimsight
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trimsight::prelude::*;

const HEADER: &str = "hack-id,year,make,model,trim,msrp,seats,type,engine_type,cylinders,horsepower_hp,combined_mpg,estimated_current_cost,expected_value_2027";

const ROWS: &[&str] = &[
    "2025-camry-le,2025,Toyota,Camry,LE,28400,5,sedan,hybrid,4,225,51,28400,20448",
    "2025-tacoma-sr,2025,Toyota,Tacoma,SR,31500,5,truck,gas,4,228,21,31500,24570",
    "2025-sienna-le,2025,Toyota,Sienna,LE,39185,8,minivan,hybrid,4,245,36,,",
    "2025-gr86-base,2025,Toyota,GR86,Base,29300,4,coupe,gas,4,228,24,29300,22561",
];

fn write_catalog(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("cars.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    path
}

/// Counts batch embeddings so cache hits can be observed
struct CountingEmbedder {
    inner: HashingEmbedder,
    batches: AtomicUsize,
    queries: AtomicUsize,
}

impl CountingEmbedder {
    fn new() -> Self {
        Self {
            inner: HashingEmbedder::new(),
            batches: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        }
    }
}

impl Embedder for CountingEmbedder {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text)
    }

    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_many(texts)
    }
}

/// Echoes the number of context records it was given
struct EchoGenerator {
    calls: AtomicUsize,
}

impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let records = prompt.matches("This is a ").count();
        Ok(format!("Answered from {} records.", records))
    }
}

#[tokio::test]
async fn test_catalog_to_answer() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), ROWS);
    let cache = EmbeddingCache::new(dir.path().join("vectors.bin"));
    let embedder = Arc::new(CountingEmbedder::new());

    let index = build_index(&catalog, &cache, embedder.as_ref()).unwrap();
    assert_eq!(index.len(), 4);

    let generator = EchoGenerator {
        calls: AtomicUsize::new(0),
    };
    let config = PipelineConfig {
        top_k: 2,
        ..PipelineConfig::default()
    };
    let pipeline = QueryPipeline::new(embedder.clone(), Arc::new(index), generator, config).unwrap();

    let answer = pipeline.query("Which minivan has 8 seats?").await.unwrap();

    assert_eq!(answer.answer, "Answered from 2 records.");
    assert_eq!(answer.hack_ids.len(), 2);
    let sienna = answer
        .hack_ids
        .iter()
        .position(|id| id == "2025-sienna-le")
        .expect("minivan retrieved");
    assert!(answer.descriptions[sienna].contains("This is a Toyota Sienna LE."));
    assert!(answer.descriptions[sienna].contains("estimated current cost of n/a"));

    let links = answer.citations();
    assert_eq!(links[sienna].link, "/data/cars?hack-id=2025-sienna-le");

    let json = serde_json::to_value(&answer).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 3);
}

#[tokio::test]
async fn test_red_car_scenario() {
    let embedder = Arc::new(HashingEmbedder::new());
    let texts: Vec<String> = ["red sedan 2020", "blue truck 2021", "red coupe 2022"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let ids: Vec<String> = ["sedan-2020", "truck-2021", "coupe-2022"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let vectors = embedder.embed_many(&texts).unwrap();
    let index = VectorIndex::build(ids, vectors, texts).unwrap();

    let generator = EchoGenerator {
        calls: AtomicUsize::new(0),
    };
    let config = PipelineConfig {
        top_k: 2,
        ..PipelineConfig::default()
    };
    let pipeline = QueryPipeline::new(embedder, Arc::new(index), generator, config).unwrap();

    let answer = pipeline.query("red car").await.unwrap();
    assert_eq!(answer.hack_ids, vec!["coupe-2022", "sedan-2020"]);
    assert_eq!(answer.descriptions, vec!["red coupe 2022", "red sedan 2020"]);
    assert!(answer.scores[0] > answer.scores[1]);
}

#[tokio::test]
async fn test_empty_question_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), ROWS);
    let cache = EmbeddingCache::new(dir.path().join("vectors.bin"));
    let embedder = Arc::new(CountingEmbedder::new());
    let index = build_index(&catalog, &cache, embedder.as_ref()).unwrap();

    let generator = EchoGenerator {
        calls: AtomicUsize::new(0),
    };
    let pipeline =
        QueryPipeline::new(embedder.clone(), Arc::new(index), generator, PipelineConfig::default())
            .unwrap();

    let err = pipeline.query("   ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(embedder.queries.load(Ordering::SeqCst), 0);
}

#[test]
fn test_rebuild_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), ROWS);
    let cache = EmbeddingCache::new(dir.path().join("vectors.bin"));
    let embedder = CountingEmbedder::new();

    let first = build_index(&catalog, &cache, &embedder).unwrap();
    let second = build_index(&catalog, &cache, &embedder).unwrap();
    assert_eq!(embedder.batches.load(Ordering::SeqCst), 1);

    let query = embedder.inner.embed("hybrid sedan").unwrap();
    let a = first.search(&query, 4).unwrap();
    let b = second.search(&query, 4).unwrap();
    assert_eq!(a.hack_ids(), b.hack_ids());
    assert_eq!(a.scores(), b.scores());
}

#[test]
fn test_catalog_change_recomputes() {
    let dir = tempfile::tempdir().unwrap();
    let cache = EmbeddingCache::new(dir.path().join("vectors.bin"));
    let embedder = CountingEmbedder::new();

    let catalog = write_catalog(dir.path(), &ROWS[..2]);
    assert_eq!(build_index(&catalog, &cache, &embedder).unwrap().len(), 2);

    let catalog = write_catalog(dir.path(), ROWS);
    assert_eq!(build_index(&catalog, &cache, &embedder).unwrap().len(), 4);
    assert_eq!(embedder.batches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_invalidate_forces_recompute() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), ROWS);
    let cache = EmbeddingCache::new(dir.path().join("vectors.bin"));
    let embedder = CountingEmbedder::new();

    build_index(&catalog, &cache, &embedder).unwrap();
    assert!(cache.invalidate().unwrap());
    assert!(!cache.invalidate().unwrap());

    build_index(&catalog, &cache, &embedder).unwrap();
    assert_eq!(embedder.batches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_empty_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), &[]);
    let cache = EmbeddingCache::new(dir.path().join("vectors.bin"));

    let result = build_index(&catalog, &cache, &HashingEmbedder::new());
    assert!(matches!(result, Err(Error::EmptyCorpus)));

    let direct = VectorIndex::build(Vec::new(), Vec::new(), Vec::new());
    assert!(matches!(direct, Err(Error::EmptyCorpus)));
}

#[test]
fn test_malformed_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cars.csv");
    std::fs::write(&path, "hack-id,year,make\n2025-camry-le,2025,Toyota\n").unwrap();
    let cache = EmbeddingCache::new(dir.path().join("vectors.bin"));

    let result = build_index(&path, &cache, &HashingEmbedder::new());
    assert!(matches!(result, Err(Error::DataFormat(_))));
}
