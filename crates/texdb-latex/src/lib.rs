//! texdb-latex
//!
//! Turns a LaTeX course tree into a `(title, text)` dataset: the normalizer,
//! the node walker used to read the root document, section title extraction
//! and content loading.

pub mod loader;
pub mod normalize;
pub mod sections;
pub mod walker;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use texdb_core::config::{resolve_with_base, DatasetSettings};
use texdb_core::{assemble, DatasetTable};
use tracing::info;

pub use loader::{load_section_texts, load_theory_records, split_theory};
pub use normalize::{normalize, Normalizer};
pub use sections::{extract_section_titles, DocumentLayout};

/// Resolved input locations of one course tree.
#[derive(Debug, Clone)]
pub struct CoursePaths {
    pub main_file: PathBuf,
    pub sections_dir: PathBuf,
    pub theory_file: PathBuf,
}

impl CoursePaths {
    /// Standard layout under `root`: `main.tex`, `section/`, and the theory
    /// file `section/polidobro/teormin.tex`.
    pub fn under(root: &Path) -> Self {
        Self::from_settings(root, &DatasetSettings::default())
    }

    pub fn from_settings(root: &Path, settings: &DatasetSettings) -> Self {
        Self {
            main_file: resolve_with_base(root, &settings.main_file),
            sections_dir: resolve_with_base(root, &settings.sections_dir),
            theory_file: resolve_with_base(root, &settings.theory_file),
        }
    }
}

/// Build the dataset table for one course tree.
///
/// Theory records come first, then one record per `\section` of the root
/// document. Fails if the root document includes a section file that is not
/// present under the sections folder.
pub fn build_dataset(paths: &CoursePaths, layout: &DocumentLayout, normalizer: &Normalizer) -> Result<DatasetTable> {
    let texts = load_section_texts(&paths.sections_dir, normalizer)?;
    let titles = extract_section_titles(&paths.main_file, layout)?;
    let theory = load_theory_records(&paths.theory_file, normalizer)?;
    info!(theory = theory.len(), sections = titles.len(), "assembling dataset");
    let table = assemble(theory, &titles, &texts)
        .with_context(|| format!("Root document {} and {} disagree", paths.main_file.display(), paths.sections_dir.display()))?;
    Ok(table)
}
