//! texdb-core
//!
//! Shared configuration, error taxonomy, domain types and the dataset table
//! used by the LaTeX extraction and vector index crates.

pub mod config;
pub mod dataset;
pub mod error;
pub mod traits;
pub mod types;

pub use dataset::{assemble, DatasetTable};
pub use error::{Error, Result};
pub use traits::Embedder;
pub use types::{Chunk, EntryKind, RetrievedChunk, SectionId, SectionRecord, SectionTitles};
