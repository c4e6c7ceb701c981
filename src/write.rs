//! Writing documents back to brat files.
//!
//! Produces `<dir>/<name>.ann` from a document's records and
//! `<dir>/<name>.txt` from its text lines, creating `dir` when needed.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::document::{Document, DocumentBuilder};
use crate::models::Entity;

/// Write the document's annotations as `<dir>/<name>.ann`.
pub fn write_ann_file(doc: &Document, dir: &Path, extension: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(format!("{}.{}", doc.name(), extension));
    std::fs::write(&path, doc.to_ann_string())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "wrote annotation file");
    Ok(path)
}

/// Write the document's text as `<dir>/<name>.txt`.
///
/// Returns `None` when the document carries no text.
pub fn write_txt_file(doc: &Document, dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let Some(text) = doc.full_text() else {
        tracing::warn!(document = doc.name(), "no text to write");
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(format!("{}.{}", doc.name(), extension));
    std::fs::write(&path, format!("{}\n", text))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "wrote text file");
    Ok(Some(path))
}

/// Split compound tags such as `PACIENTE-PROFESION` into two documents, one
/// per annotation axis.
///
/// The first document keeps the part before the first `separator`, the
/// second the part after it. A tag without the separator is kept whole in
/// both. Only entities are carried over; text is kept.
pub fn split_tag_axes(doc: &Document, separator: &str) -> (Document, Document) {
    let mut first = DocumentBuilder::new(doc.name())
        .path(doc.path())
        .collection(doc.collection().map(str::to_string));
    let mut second = first.clone();

    if let Some(lines) = doc.text() {
        for line in lines {
            first.push_text_line(line.as_str());
            second.push_text_line(line.as_str());
        }
    }

    for ent in doc.entities() {
        let (a, b) = ent
            .tag
            .split_once(separator)
            .unwrap_or((ent.tag.as_str(), ent.tag.as_str()));
        first.push_entity(Entity {
            tag: a.to_string(),
            ..ent.clone()
        });
        second.push_entity(Entity {
            tag: b.to_string(),
            ..ent.clone()
        });
    }

    (first.build(), second.build())
}
