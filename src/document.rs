//! Annotated documents.
//!
//! A [`Document`] owns every record read from one `.ann` file plus, when
//! requested, the lines of its companion text file. Parsing is lenient:
//! malformed or unsupported lines are logged and skipped.
//!
//! After all lines are read a linking pass associates relations, events,
//! attributes and notes with the entities they reference. Links are stored
//! as indices into the document's own record lists, so entities never own
//! the records pointing at them.
//!
//! Documents are immutable once built, apart from their collection label.
//! Use [`DocumentBuilder`] to assemble new documents (sentence segmentation,
//! merging, tag splitting).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{Attribute, Entity, Event, Note, RecordKind, Relation};
use crate::parse::{parse_line, AnnLine};
use crate::stats::AnnotationStats;

/// All records of a document, grouped by kind, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Annotations {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
    pub events: Vec<Event>,
    pub attributes: Vec<Attribute>,
    pub notes: Vec<Note>,
}

impl Annotations {
    pub fn push(&mut self, line: AnnLine) {
        match line {
            AnnLine::Entity(e) => self.entities.push(e),
            AnnLine::Relation(r) => self.relations.push(r),
            AnnLine::Event(e) => self.events.push(e),
            AnnLine::Attribute(a) => self.attributes.push(a),
            AnnLine::Note(n) => self.notes.push(n),
        }
    }

    pub fn len(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Entities => self.entities.len(),
            RecordKind::Relations => self.relations.len(),
            RecordKind::Events => self.events.len(),
            RecordKind::Attributes => self.attributes.len(),
            RecordKind::Notes => self.notes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        RecordKind::ALL.iter().all(|k| self.len(*k) == 0)
    }

    /// Canonical `.ann` lines: entities, relations, events, attributes, notes.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.extend(self.entities.iter().map(ToString::to_string));
        lines.extend(self.relations.iter().map(ToString::to_string));
        lines.extend(self.events.iter().map(ToString::to_string));
        lines.extend(self.attributes.iter().map(ToString::to_string));
        lines.extend(self.notes.iter().map(ToString::to_string));
        lines
    }
}

/// Indices of the records that reference one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct EntityLinks {
    relations: Vec<usize>,
    events: Vec<usize>,
    attributes: Vec<usize>,
    notes: Vec<usize>,
}

/// Associate every relation, event, attribute and note with the entities
/// whose identifier it references.
fn link(anns: &Annotations) -> HashMap<String, EntityLinks> {
    let mut links: HashMap<String, EntityLinks> = anns
        .entities
        .iter()
        .map(|e| (e.name.clone(), EntityLinks::default()))
        .collect();

    for (i, rel) in anns.relations.iter().enumerate() {
        let [a, b] = rel.targets();
        if let Some(l) = links.get_mut(a) {
            l.relations.push(i);
        }
        if b != a {
            if let Some(l) = links.get_mut(b) {
                l.relations.push(i);
            }
        }
    }

    for (i, ev) in anns.events.iter().enumerate() {
        for (id, l) in links.iter_mut() {
            if ev.involves(id) {
                l.events.push(i);
            }
        }
    }

    for (i, att) in anns.attributes.iter().enumerate() {
        if let Some(l) = links.get_mut(att.target()) {
            l.attributes.push(i);
        }
    }

    for (i, note) in anns.notes.iter().enumerate() {
        if let Some(l) = links.get_mut(note.target.as_str()) {
            l.notes.push(i);
        }
    }

    links
}

/// How a document is read from disk.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Also read the same-named text file.
    pub include_text: bool,
    pub text_extension: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            include_text: false,
            text_extension: "txt".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    name: String,
    collection: Option<String>,
    anns: Annotations,
    text: Option<Vec<String>>,
    links: HashMap<String, EntityLinks>,
    stats: AnnotationStats,
}

impl Document {
    /// Parse an annotation file without its text.
    pub fn parse(path: &Path) -> Result<Document> {
        Document::open(path, &LoadOptions::default())
    }

    pub fn open(path: &Path, options: &LoadOptions) -> Result<Document> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read annotation file: {}", path.display()))?;

        let mut builder = DocumentBuilder::new(file_stem(path)).path(path);
        builder.anns = parse_annotations(path, &content);

        if options.include_text {
            let text_path = path.with_extension(&options.text_extension);
            match std::fs::read_to_string(&text_path) {
                Ok(text) => builder.text = Some(split_lines(&text)),
                Err(e) => tracing::warn!(
                    path = %text_path.display(),
                    error = %e,
                    "text file not found, document loaded without text"
                ),
            }
        }

        Ok(builder.build())
    }

    /// Parse annotations held in memory. `path` only names the document.
    pub fn from_ann_str(path: &Path, content: &str) -> Document {
        let mut builder = DocumentBuilder::new(file_stem(path)).path(path);
        builder.anns = parse_annotations(path, content);
        builder.build()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn set_collection(&mut self, label: impl Into<String>) {
        self.collection = Some(label.into());
    }

    pub fn anns(&self) -> &Annotations {
        &self.anns
    }

    pub fn entities(&self) -> &[Entity] {
        &self.anns.entities
    }

    /// Text lines, if the companion text file was loaded.
    pub fn text(&self) -> Option<&[String]> {
        self.text.as_deref()
    }

    pub fn full_text(&self) -> Option<String> {
        self.text.as_ref().map(|lines| lines.join("\n"))
    }

    pub fn stats(&self) -> &AnnotationStats {
        &self.stats
    }

    /// A document without entities counts as empty.
    pub fn is_empty(&self) -> bool {
        self.anns.entities.is_empty()
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.anns.entities.iter().find(|e| e.name == id)
    }

    pub fn relations_of(&self, entity_id: &str) -> Vec<&Relation> {
        self.linked(entity_id, |l| &l.relations, &self.anns.relations)
    }

    pub fn events_of(&self, entity_id: &str) -> Vec<&Event> {
        self.linked(entity_id, |l| &l.events, &self.anns.events)
    }

    pub fn attributes_of(&self, entity_id: &str) -> Vec<&Attribute> {
        self.linked(entity_id, |l| &l.attributes, &self.anns.attributes)
    }

    pub fn notes_of(&self, entity_id: &str) -> Vec<&Note> {
        self.linked(entity_id, |l| &l.notes, &self.anns.notes)
    }

    fn linked<'a, T>(
        &'a self,
        entity_id: &str,
        pick: impl Fn(&EntityLinks) -> &Vec<usize>,
        records: &'a [T],
    ) -> Vec<&'a T> {
        self.links
            .get(entity_id)
            .map(|l| pick(l).iter().filter_map(|&i| records.get(i)).collect())
            .unwrap_or_default()
    }

    /// Texts of every entity tagged `tag`, in file order.
    pub fn text_from_tag(&self, tag: &str) -> Vec<&str> {
        self.anns
            .entities
            .iter()
            .filter(|e| e.tag == tag)
            .map(|e| e.text.as_str())
            .collect()
    }

    /// Entities whose text differs from the document text at their span.
    ///
    /// Offsets count characters. Fragments of a discontinuous span are
    /// compared joined by a single space. `None` when no text was loaded.
    pub fn misaligned_entities(&self) -> Option<Vec<&Entity>> {
        let text: Vec<char> = self.full_text()?.chars().collect();
        Some(
            self.anns
                .entities
                .iter()
                .filter(|e| covered_text(&text, e).as_deref() != Some(e.text.as_str()))
                .collect(),
        )
    }

    /// The whole document in `.ann` format, newline-terminated.
    pub fn to_ann_string(&self) -> String {
        let mut out = String::new();
        for line in self.anns.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

fn covered_text(text: &[char], entity: &Entity) -> Option<String> {
    let mut pieces = Vec::new();
    for (start, end) in entity.span.fragments() {
        if start > end || end > text.len() {
            return None;
        }
        pieces.push(text[start..end].iter().collect::<String>());
    }
    Some(pieces.join(" "))
}

fn parse_annotations(path: &Path, content: &str) -> Annotations {
    let mut anns = Annotations::default();
    for (i, line) in content.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(parsed)) => anns.push(parsed),
            Ok(None) => {}
            Err(e) => tracing::warn!(
                path = %path.display(),
                line = i + 1,
                error = %e,
                "skipping annotation line"
            ),
        }
    }
    anns
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Split text into lines without their `\n` or `\r\n`. A single trailing
/// newline does not produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Mutable accumulator for documents that are not read from a file.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    path: PathBuf,
    name: String,
    collection: Option<String>,
    anns: Annotations,
    text: Option<Vec<String>>,
}

impl DocumentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn collection(mut self, label: Option<String>) -> Self {
        self.collection = label;
        self
    }

    pub fn push_entity(&mut self, entity: Entity) {
        self.anns.entities.push(entity);
    }

    pub fn push_relation(&mut self, relation: Relation) {
        self.anns.relations.push(relation);
    }

    pub fn push_event(&mut self, event: Event) {
        self.anns.events.push(event);
    }

    pub fn push_attribute(&mut self, attribute: Attribute) {
        self.anns.attributes.push(attribute);
    }

    pub fn push_note(&mut self, note: Note) {
        self.anns.notes.push(note);
    }

    /// Append one line of text.
    pub fn push_text_line(&mut self, line: impl Into<String>) {
        self.text.get_or_insert_with(Vec::new).push(line.into());
    }

    /// Copy the relations, events, attributes and notes that `source` links
    /// to `entity_id`. Records already present are not duplicated.
    pub fn copy_linked(&mut self, source: &Document, entity_id: &str) {
        for rel in source.relations_of(entity_id) {
            if !self.anns.relations.iter().any(|r| r.name == rel.name) {
                self.anns.relations.push(rel.clone());
            }
        }
        for ev in source.events_of(entity_id) {
            if !self.anns.events.iter().any(|e| e.name == ev.name) {
                self.anns.events.push(ev.clone());
            }
        }
        for att in source.attributes_of(entity_id) {
            if !self.anns.attributes.iter().any(|a| a.name == att.name) {
                self.anns.attributes.push(att.clone());
            }
        }
        for note in source.notes_of(entity_id) {
            if !self.anns.notes.iter().any(|n| n.name == note.name) {
                self.anns.notes.push(note.clone());
            }
        }
    }

    /// Run the linking pass and derive statistics.
    pub fn build(self) -> Document {
        let links = link(&self.anns);
        let stats = AnnotationStats::from_annotations(&self.anns);
        Document {
            path: self.path,
            name: self.name,
            collection: self.collection,
            anns: self.anns,
            text: self.text,
            links,
            stats,
        }
    }
}
