//! Recursive character splitting.
//!
//! Text is split on the first separator that occurs in it; pieces that are
//! still too long are split again with the remaining separators, down to
//! single characters. Short neighbouring pieces are then merged back into
//! chunks of at most `chunk_size` characters, each chunk starting with up to
//! `chunk_overlap` characters carried over from the end of the previous one.
//! Separators stay attached to the start of the piece that follows them.

use tracing::warn;

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self::with_separators(chunk_size, chunk_overlap, &DEFAULT_SEPARATORS)
    }

    pub fn with_separators(chunk_size: usize, chunk_overlap: usize, separators: &[&str]) -> Self {
        Self { chunk_size, chunk_overlap, separators: separators.iter().map(|s| s.to_string()).collect() }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep.as_str();
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut good = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                chunks.extend(self.merge(&good));
                good.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_with(&piece, remaining));
            }
        }
        if !good.is_empty() {
            chunks.extend(self.merge(&good));
        }
        chunks
    }

    /// Greedily pack `pieces` into chunks, keeping an overlapping tail.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: std::collections::VecDeque<&str> = std::collections::VecDeque::new();
        let mut total = 0usize;
        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(total, chunk_size = self.chunk_size, "created a chunk longer than the chunk size");
                }
                if !current.is_empty() {
                    if let Some(doc) = join(&current) {
                        docs.push(doc);
                    }
                    while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                        let Some(front) = current.pop_front() else { break };
                        total -= char_len(front);
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }
        if let Some(doc) = join(&current) {
            docs.push(doc);
        }
        docs
    }
}

fn char_len(s: &str) -> usize { s.chars().count() }

fn join(pieces: &std::collections::VecDeque<&str>) -> Option<String> {
    let text: String = pieces.iter().copied().collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split on `separator`, prefixing every piece after the first with it.
/// An empty separator splits into single characters. Empty pieces are dropped.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut parts = text.split(separator);
    let mut pieces = Vec::new();
    if let Some(first) = parts.next() {
        pieces.push(first.to_string());
    }
    pieces.extend(parts.map(|p| format!("{separator}{p}")));
    pieces.retain(|p| !p.is_empty());
    pieces
}
