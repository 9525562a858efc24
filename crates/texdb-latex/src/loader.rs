//! Section content loading.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use texdb_core::{Error, SectionId, SectionRecord};
use tracing::{debug, info, warn};

use crate::normalize::Normalizer;

pub const CONTENT_EXTENSION: &str = "tex";

static SUBSECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\subsection\{(.+?)\}").expect("subsection pattern must compile"));

/// Normalized content of every `.tex` file under `dir`, keyed by file stem.
///
/// Files are visited in file-name order, depth first. When two files share a
/// stem the one visited last wins. A missing `dir` is [`Error::NotFound`];
/// entries the walk cannot read are skipped with a warning.
pub fn load_section_texts(dir: &Path, normalizer: &Normalizer) -> Result<HashMap<SectionId, String>> {
    if !dir.is_dir() {
        return Err(Error::NotFound(format!("sections directory {}", dir.display())).into());
    }
    let files = list_content_files(dir);
    let mut texts = HashMap::with_capacity(files.len());
    for path in &files {
        let id = section_id_from_path(path);
        let content = read_file_content(path)?;
        if texts.insert(id.clone(), normalizer.normalize(&content)).is_some() {
            debug!(%id, path = %path.display(), "section stem collision, keeping the later file");
        }
    }
    info!(files = files.len(), sections = texts.len(), dir = %dir.display(), "section texts loaded");
    Ok(texts)
}

/// File name up to its first `.`; `lecture.draft.tex` gives `lecture`.
pub fn section_id_from_path(path: &Path) -> SectionId {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    name.split('.').next().unwrap_or_default().to_string()
}

/// Split a theory file into `(heading, normalized body)` records.
///
/// A body is the text strictly between one `\subsection{...}` heading and the
/// next. Text after the last heading has no closing heading and is not
/// emitted, so `n` headings give `n - 1` records.
pub fn split_theory(text: &str, normalizer: &Normalizer) -> Vec<SectionRecord> {
    let headings: Vec<_> = SUBSECTION.captures_iter(text).collect();
    headings
        .windows(2)
        .filter_map(|pair| {
            let (current, next) = (&pair[0], &pair[1]);
            let title = current.get(1)?.as_str();
            let body = &text[current.get(0)?.end()..next.get(0)?.start()];
            Some(SectionRecord::new(title, normalizer.normalize(body)))
        })
        .collect()
}

pub fn load_theory_records(path: &Path, normalizer: &Normalizer) -> Result<Vec<SectionRecord>> {
    let text = read_file_content(path)?;
    let records = split_theory(&text, normalizer);
    info!(records = records.len(), path = %path.display(), "theory file split");
    Ok(records)
}

/// File content as UTF-8, replacing invalid bytes.
pub(crate) fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => {
            let bytes = fs::read(file_path).with_context(|| format!("Failed to read {}", file_path.display()))?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
    }
}

fn list_content_files(root: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.map_err(|err| warn!(error = %err, "skipping unreadable entry")).ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some(CONTENT_EXTENSION))
        .map(|e| e.into_path())
        .collect()
}
