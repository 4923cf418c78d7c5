use std::path::Path;
use trimsight_catalog::load_catalog;
use trimsight_core::{Embedder, Error, Result, VectorIndex};
use trimsight_storage::EmbeddingCache;

/// Load the catalog, reuse or compute its embeddings, and build the index.
///
/// Runs once per process; the resulting index is read-only and meant to be
/// shared behind an `Arc`.
pub fn build_index<E: Embedder + ?Sized>(
    catalog: &Path,
    cache: &EmbeddingCache,
    embedder: &E,
) -> Result<VectorIndex> {
    let records = load_catalog(catalog)?;
    if records.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    let entry = cache.build_or_load(&records, embedder)?;
    let index = entry.into_index()?;

    tracing::info!(
        records = index.len(),
        dimension = index.dimension(),
        cache = %cache.path().display(),
        "vector index ready"
    );
    Ok(index)
}
