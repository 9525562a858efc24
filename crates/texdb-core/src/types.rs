//! Domain types shared by the dataset builder and the vector index.

use serde::{Deserialize, Serialize};

/// Key derived from a content file stem, used to join titles to text bodies.
pub type SectionId = String;

/// One row of the exported dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub title: String,
    pub text: String,
}

impl SectionRecord {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { title: title.into(), text: text.into() }
    }
}

/// Section identifiers mapped to titles, in the order the root document declares them.
///
/// Inserting an identifier twice keeps its first position and replaces the title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTitles {
    entries: Vec<(SectionId, String)>,
}

impl SectionTitles {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, id: impl Into<SectionId>, title: impl Into<String>) {
        let id = id.into();
        let title = title.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = title,
            None => self.entries.push((id, title)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.iter().find(|(existing, _)| existing == id).map(|(_, title)| title.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, title)| (id.as_str(), title.as_str()))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<I: Into<SectionId>, T: Into<String>> FromIterator<(I, T)> for SectionTitles {
    fn from_iter<It: IntoIterator<Item = (I, T)>>(iter: It) -> Self {
        let mut titles = Self::new();
        for (id, title) in iter { titles.insert(id, title); }
        titles
    }
}

/// A bounded, overlapping piece of a dataset row prepared for embedding.
///
/// - `title`: section title inherited from the row
/// - `text`: the chunk payload
/// - `row`: zero-based row index in the dataset file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub title: String,
    pub text: String,
    pub row: usize,
}

/// What an entry in the vector store was embedded from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntryKind {
    /// Embedding of the chunk text itself.
    Content,
    /// Embedding of the section title, paired with the row's full text.
    Title,
}

/// A chunk returned by the retriever.
///
/// `score` is the cosine similarity to the query; results are ordered by
/// MMR selection, so scores are not necessarily descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub title: String,
    pub text: String,
    pub row: usize,
    pub kind: EntryKind,
    pub score: f32,
}
