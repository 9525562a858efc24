//! texdb-vector
//!
//! Chunking, embedding and diversity-aware retrieval over the course dataset.

pub mod mmr;
pub mod retriever;
pub mod splitter;
pub mod store;

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use texdb_core::config::IndexSettings;
use texdb_core::{Chunk, DatasetTable, Embedder, EntryKind};
use tracing::info;

pub use mmr::{cosine_similarity, mmr_select};
pub use retriever::Retriever;
pub use splitter::RecursiveSplitter;
pub use store::{StoredEntry, VectorStore};

/// Split every dataset row into chunks that keep the row's title and index.
pub fn chunk_table(table: &DatasetTable, splitter: &RecursiveSplitter) -> Vec<Chunk> {
    table
        .records()
        .iter()
        .enumerate()
        .flat_map(|(row, record)| {
            splitter
                .split(&record.text)
                .into_iter()
                .map(move |text| Chunk { title: record.title.clone(), text, row })
        })
        .collect()
}

/// Read the dataset file and index it.
pub fn load_index<'a>(csv_path: &Path, embedder: &'a dyn Embedder, settings: &IndexSettings) -> Result<Retriever<'a>> {
    let table = DatasetTable::read_csv(csv_path)
        .with_context(|| format!("Failed to read dataset {}", csv_path.display()))?;
    build_index(&table, embedder, settings)
}

/// Embed the chunks of `table` and, when enabled, one title entry per row.
///
/// A title entry carries the embedding of the row's title and the row's full
/// text as its payload.
pub fn build_index<'a>(table: &DatasetTable, embedder: &'a dyn Embedder, settings: &IndexSettings) -> Result<Retriever<'a>> {
    let splitter = RecursiveSplitter::new(settings.chunk_size, settings.chunk_overlap);
    let chunks = chunk_table(table, &splitter);
    info!(rows = table.len(), chunks = chunks.len(), "dataset split into chunks");

    let titles: Vec<Chunk> = if settings.index_titles {
        table
            .records()
            .iter()
            .enumerate()
            .map(|(row, r)| Chunk { title: r.title.clone(), text: r.text.clone(), row })
            .collect()
    } else {
        Vec::new()
    };

    let pb = ProgressBar::new((chunks.len() + titles.len()) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} embeddings ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );

    let mut store = VectorStore::new(embedder.dim());
    pb.set_message("chunks");
    embed_into(&mut store, chunks, EntryKind::Content, embedder, &pb, |c| c.text.clone())?;
    pb.set_message("titles");
    embed_into(&mut store, titles, EntryKind::Title, embedder, &pb, |c| c.title.clone())?;
    pb.finish_with_message("done");

    info!(entries = store.len(), dim = store.dim(), "index ready");
    Ok(Retriever::new(store, embedder, settings))
}

const EMBED_BATCH: usize = 64;

fn embed_into(
    store: &mut VectorStore,
    chunks: Vec<Chunk>,
    kind: EntryKind,
    embedder: &dyn Embedder,
    pb: &ProgressBar,
    source: impl Fn(&Chunk) -> String,
) -> Result<()> {
    let mut pending = chunks.into_iter().peekable();
    while pending.peek().is_some() {
        let batch: Vec<Chunk> = pending.by_ref().take(EMBED_BATCH).collect();
        let inputs: Vec<String> = batch.iter().map(&source).collect();
        let vectors = embedder.embed_batch(&inputs)?;
        anyhow::ensure!(vectors.len() == batch.len(), "embedder returned {} vectors for {} inputs", vectors.len(), batch.len());
        for (chunk, vector) in batch.into_iter().zip(vectors) {
            store.add(chunk, kind, vector)?;
        }
        pb.inc(inputs.len() as u64);
    }
    Ok(())
}
