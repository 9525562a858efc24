//! Flat in-memory vector store with exact L2 search.

use texdb_core::{Chunk, EntryKind};

#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub chunk: Chunk,
    pub kind: EntryKind,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    dim: usize,
    entries: Vec<StoredEntry>,
}

impl VectorStore {
    pub fn new(dim: usize) -> Self { Self { dim, entries: Vec::new() } }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn entries(&self) -> &[StoredEntry] { &self.entries }

    pub fn get(&self, idx: usize) -> Option<&StoredEntry> { self.entries.get(idx) }

    pub fn add(&mut self, chunk: Chunk, kind: EntryKind, vector: Vec<f32>) -> anyhow::Result<()> {
        anyhow::ensure!(
            vector.len() == self.dim,
            "vector for row {} has dimension {}, store expects {}",
            chunk.row,
            vector.len(),
            self.dim
        );
        self.entries.push(StoredEntry { chunk, kind, vector });
        Ok(())
    }

    /// Indices of the `n` entries nearest to `query` by Euclidean distance,
    /// closest first. Ties keep insertion order.
    pub fn nearest(&self, query: &[f32], n: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> =
            self.entries.iter().enumerate().map(|(i, e)| (i, l2_distance(query, &e.vector))).collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(n);
        scored
    }
}

pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}
