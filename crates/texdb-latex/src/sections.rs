//! Section title extraction from the root document.
//!
//! The course template lays the root document out as a fixed sequence: the
//! body environment is a known top-level node, and every `\section{Title}`
//! inside it is followed (after one whitespace node) by the `\input{...}` of
//! its content file. [`DocumentLayout`] names those two positions.

use std::path::Path;

use anyhow::{Context, Result};
use texdb_core::{Error, SectionTitles};
use tracing::{debug, warn};

use crate::loader::read_file_content;
use crate::walker::{self, Node};

/// Positional contract between a section declaration and its content include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLayout {
    /// Index of the top-level node whose children hold the sections.
    pub body_node: usize,
    /// Distance from a `\section` node to its `\input` node.
    pub include_offset: usize,
}

impl DocumentLayout {
    pub const COURSE_TEMPLATE: Self = Self { body_node: 2, include_offset: 2 };
}

impl Default for DocumentLayout {
    fn default() -> Self { Self::COURSE_TEMPLATE }
}

/// Argument slot holding the title of `\section*[short]{title}`.
const SECTION_TITLE_ARG: usize = 2;

pub fn extract_section_titles(root_doc: &Path, layout: &DocumentLayout) -> Result<SectionTitles> {
    let source = read_file_content(root_doc)
        .with_context(|| format!("Failed to read root document {}", root_doc.display()))?;
    let titles = section_titles_from_source(&source, layout)
        .with_context(|| format!("Failed to extract sections from {}", root_doc.display()))?;
    Ok(titles)
}

/// Map section identifiers to titles.
///
/// Sections whose neighbour is not an `\input` (e.g. an `\includegraphics`),
/// or whose title or include path is not plain text, are skipped with a
/// warning. A missing or childless body node is an [`Error::Layout`].
pub fn section_titles_from_source(source: &str, layout: &DocumentLayout) -> texdb_core::Result<SectionTitles> {
    let nodes = walker::parse(source);
    let body = nodes
        .get(layout.body_node)
        .ok_or_else(|| Error::Layout(format!("expected at least {} top-level nodes, found {}", layout.body_node + 1, nodes.len())))?;
    let children = body
        .children()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::Layout(format!("top-level node {} has no children", layout.body_node)))?;

    let mut titles = SectionTitles::new();
    for (i, node) in children.iter().enumerate() {
        if !node.is_macro("section") {
            continue;
        }
        match section_entry(children, i, layout.include_offset) {
            Ok(Some((id, title))) => {
                debug!(%id, %title, "section");
                titles.insert(id, title);
            }
            Ok(None) => debug!(position = i, "section without content include, skipped"),
            Err(reason) => warn!(position = i, reason, "section skipped"),
        }
    }
    Ok(titles)
}

fn section_entry(children: &[Node], i: usize, offset: usize) -> std::result::Result<Option<(String, String)>, &'static str> {
    let title = children[i]
        .as_macro()
        .and_then(|m| m.arg(SECTION_TITLE_ARG))
        .and_then(|arg| arg.first_chars())
        .ok_or("title is not plain text")?;
    let Some(include) = children.get(i + offset) else {
        return Err("no node at include offset");
    };
    if include.is_macro("includegraphics") {
        return Ok(None);
    }
    let Some(include) = include.as_macro().filter(|m| m.name == "input") else {
        return Ok(None);
    };
    let path = include.arg(0).and_then(|arg| arg.first_chars()).ok_or("include path is not plain text")?;
    Ok(Some((section_id_from_include(path), title.to_string())))
}

/// Last `/` segment of an include path, up to its first `.`.
pub fn section_id_from_include(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.split('.').next().unwrap_or(file).to_string()
}
