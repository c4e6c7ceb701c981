//! Line-based sentence segmentation and its inverse.
//!
//! [`segment`] turns a document into one sub-document per stored text line,
//! with entity offsets rebased so that each line starts at 0. [`merge`]
//! concatenates documents back into one, rebasing offsets onto the
//! concatenated text and renumbering entities `T1, T2, …`.
//!
//! # Offsets
//!
//! Offsets count characters in the text formed by joining the lines with a
//! single `\n`. A line starting at `offset` ends at `offset + len(line)`,
//! or at `offset` itself for an empty line; the next line starts one past
//! that end. No linguistic sentence splitter is involved: a "sentence" is
//! exactly one stored line, so the bookkeeping stays in sync with the text
//! the annotation tool saw.
//!
//! # Limitations
//!
//! - Entities crossing a line boundary belong to no sentence and are dropped.
//! - [`merge`] carries entities only; relations, events, attributes and
//!   notes of the inputs are not renumbered and do not appear in the result.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::document::{Document, DocumentBuilder};
use crate::models::Entity;

/// Iterator over the sentence documents of one document, in line order.
///
/// Cloning the iterator (or calling [`segment`] again) restarts it.
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    doc: &'a Document,
    lines: &'a [String],
    index: usize,
    offset: usize,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        let line = self.lines.get(self.index)?;
        let start = self.offset;
        let end = line_end(start, line);

        let mut builder = DocumentBuilder::new(format!("{}_sent{}", self.doc.name(), self.index + 1))
            .path(self.doc.path())
            .collection(self.doc.collection().map(str::to_string));
        builder.push_text_line(line.as_str());

        for ent in self.doc.entities() {
            if ent.span.within(start, end) {
                builder.push_entity(Entity {
                    span: ent.span.map_offsets(|o| o - start),
                    ..ent.clone()
                });
                builder.copy_linked(self.doc, &ent.name);
            }
        }

        self.index += 1;
        self.offset = end + 1;
        Some(builder.build())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.lines.len() - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Sentences<'_> {}

fn line_end(start: usize, line: &str) -> usize {
    if line.trim_matches(['\n', '\r']).is_empty() {
        start
    } else {
        start + line.chars().count()
    }
}

/// Split `doc` into one document per text line.
///
/// Each sentence document is named `<doc>_sent<n>` (1-based), keeps the
/// source path and collection, holds its single line as text, and contains
/// every entity lying entirely within that line, offsets shifted to the
/// line start. Records linked to a copied entity are copied along with it.
pub fn segment(doc: &Document) -> Result<Sentences<'_>> {
    let Some(lines) = doc.text() else {
        bail!("Text for document '{}' was not loaded", doc.name());
    };
    Ok(Sentences {
        doc,
        lines,
        index: 0,
        offset: 0,
    })
}

/// Concatenate documents into a single document named `name`.
///
/// Text lines are appended in order; an empty text file counts as one empty
/// line. Entities get fresh sequential identifiers and their offsets are
/// shifted by the length of everything before them. Fails when any input
/// was loaded without text, since its entities could not be placed.
pub fn merge<'a>(name: &str, docs: impl IntoIterator<Item = &'a Document>) -> Result<Document> {
    let mut builder = DocumentBuilder::new(name);
    let mut offset = 0usize;
    let mut next_id = 1usize;
    let mut first_path: Option<PathBuf> = None;

    for doc in docs {
        if first_path.is_none() {
            first_path = Some(doc.path().with_file_name(format!("{}.ann", name)));
        }

        let lines: Vec<&str> = match doc.text() {
            Some([]) => vec![""],
            Some(lines) => lines.iter().map(String::as_str).collect(),
            None => bail!("Text for document '{}' was not loaded", doc.name()),
        };
        let text_len = lines.iter().map(|l| l.chars().count()).sum::<usize>() + lines.len() - 1;
        for line in &lines {
            builder.push_text_line(*line);
        }

        for ent in doc.entities() {
            builder.push_entity(Entity {
                name: format!("T{}", next_id),
                span: ent.span.map_offsets(|o| o + offset),
                ..ent.clone()
            });
            next_id += 1;
        }

        offset += text_len + 1;
    }

    tracing::debug!(document = name, entities = next_id - 1, "merged documents");

    let path = first_path.unwrap_or_else(|| PathBuf::from(format!("{}.ann", name)));
    Ok(builder.path(path).build())
}
