use anyhow::Result;
use texdb_core::config::IndexSettings;
use texdb_core::{Embedder, RetrievedChunk};
use tracing::debug;

use crate::mmr::{cosine_similarity, mmr_select};
use crate::store::VectorStore;

/// Diversity-aware retrieval over a [`VectorStore`].
pub struct Retriever<'a> {
    store: VectorStore,
    embedder: &'a dyn Embedder,
    k: usize,
    fetch_k: usize,
    lambda_mult: f32,
}

impl<'a> Retriever<'a> {
    pub fn new(store: VectorStore, embedder: &'a dyn Embedder, settings: &IndexSettings) -> Self {
        Self { store, embedder, k: settings.k, fetch_k: settings.fetch_k, lambda_mult: settings.lambda_mult }
    }

    pub fn store(&self) -> &VectorStore { &self.store }

    /// Top `k` chunks for `query`, chosen by MMR among the `fetch_k`
    /// nearest entries.
    pub fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        let query_vec = self.embedder.embed_query(query)?;
        let nearest = self.store.nearest(&query_vec, self.fetch_k.max(self.k));
        let candidates: Vec<&[f32]> = nearest
            .iter()
            .filter_map(|(idx, _)| self.store.get(*idx))
            .map(|e| e.vector.as_slice())
            .collect();
        let selected = mmr_select(&query_vec, &candidates, self.k, self.lambda_mult);
        debug!(candidates = candidates.len(), selected = selected.len(), "mmr selection");

        let results = selected
            .into_iter()
            .filter_map(|i| self.store.get(nearest[i].0))
            .map(|entry| RetrievedChunk {
                title: entry.chunk.title.clone(),
                text: entry.chunk.text.clone(),
                row: entry.chunk.row,
                kind: entry.kind,
                score: cosine_similarity(&query_vec, &entry.vector),
            })
            .collect();
        Ok(results)
    }
}
