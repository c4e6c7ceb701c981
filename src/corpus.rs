//! Corpus aggregation.
//!
//! A [`Corpus`] is every annotation document found under a root directory,
//! plus statistics summed over all of them. Documents can be grouped into
//! collections after construction, either by their parent folder or by
//! matching candidate labels against their paths.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::discover::{annotation_files, DiscoverOptions};
use crate::document::{Document, LoadOptions};
use crate::models::RecordKind;
use crate::stats::AnnotationStats;

#[derive(Debug, Clone)]
pub struct Corpus {
    path: PathBuf,
    name: String,
    docs: Vec<Document>,
    collections: BTreeSet<String>,
    stats: AnnotationStats,
}

impl Corpus {
    /// Parse every `.ann` file under `root`.
    pub fn build(root: &Path, include_text: bool) -> Result<Corpus> {
        let load = LoadOptions {
            include_text,
            ..LoadOptions::default()
        };
        Corpus::build_with(root, &DiscoverOptions::default(), &load)
    }

    pub fn build_with(
        root: &Path,
        discover: &DiscoverOptions,
        load: &LoadOptions,
    ) -> Result<Corpus> {
        let files = annotation_files(root, discover)?;

        let mut docs = Vec::with_capacity(files.len());
        for file in &files {
            match Document::open(file, load) {
                Ok(doc) => docs.push(doc),
                Err(e) => tracing::warn!(path = %file.display(), error = %e, "skipping document"),
            }
        }

        let corpus = Corpus::from_documents(root, docs);
        tracing::info!(
            corpus = %corpus.name,
            docs = corpus.docs.len(),
            "corpus loaded"
        );
        Ok(corpus)
    }

    /// Assemble a corpus from documents that were already parsed.
    pub fn from_documents(path: impl Into<PathBuf>, docs: Vec<Document>) -> Corpus {
        let path = path.into();
        let name = path
            .components()
            .next_back()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .unwrap_or_default();

        let mut stats = AnnotationStats::default();
        for doc in &docs {
            stats.absorb(doc.stats());
        }
        let collections = docs
            .iter()
            .filter_map(|d| d.collection().map(str::to_string))
            .collect();

        Corpus {
            path,
            name,
            docs,
            collections,
            stats,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn collections(&self) -> &BTreeSet<String> {
        &self.collections
    }

    pub fn stats(&self) -> &AnnotationStats {
        &self.stats
    }

    /// Sorted distinct tags seen for one record kind.
    pub fn labels(&self, kind: RecordKind) -> Vec<&str> {
        self.stats.labels(kind)
    }

    /// Label every document with the name of the folder containing it.
    /// Returns the number of documents per label.
    pub fn collections_by_subfolder(&mut self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for doc in &mut self.docs {
            let label = doc
                .path()
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().to_string());
            if let Some(label) = label {
                doc.set_collection(label.clone());
                self.collections.insert(label.clone());
                *counts.entry(label).or_default() += 1;
            }
        }
        counts
    }

    /// Label each still-unlabelled document with the first candidate that
    /// appears in its path. Longer candidates are tried first so that a
    /// short label never wins inside a longer one.
    pub fn collections_by_list(&mut self, candidates: &[&str]) -> BTreeMap<String, usize> {
        let mut ordered: Vec<&str> = candidates.iter().copied().filter(|c| !c.is_empty()).collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut counts = BTreeMap::new();
        for doc in &mut self.docs {
            if doc.collection().is_some() {
                continue;
            }
            let path = doc.path().to_string_lossy().to_string();
            if let Some(label) = ordered.iter().find(|c| path.contains(**c)) {
                doc.set_collection(*label);
                self.collections.insert(label.to_string());
                *counts.entry(label.to_string()).or_default() += 1;
            }
        }
        counts
    }

    pub fn collection_documents(&self, label: &str) -> Vec<&Document> {
        self.docs
            .iter()
            .filter(|d| d.collection() == Some(label))
            .collect()
    }

    /// Look a document up by name, optionally within one collection.
    /// With duplicate names the first match wins.
    pub fn by_name(&self, name: &str, collection: Option<&str>) -> Option<&Document> {
        let found = self.docs.iter().find(|d| {
            d.name() == name && collection.map_or(true, |c| d.collection() == Some(c))
        });
        if found.is_none() {
            tracing::warn!(
                corpus = %self.name,
                document = name,
                collection = collection.unwrap_or(""),
                "document not found"
            );
        }
        found
    }

    pub fn random_document(&self) -> Option<&Document> {
        self.random_document_with(&mut rand::thread_rng())
    }

    pub fn random_document_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Document> {
        self.docs.choose(rng)
    }

    /// Documents without a single entity.
    pub fn empty_documents(&self) -> Vec<&Document> {
        self.docs.iter().filter(|d| d.is_empty()).collect()
    }

    pub fn text_from_tag(&self, tag: &str) -> Vec<&str> {
        self.docs.iter().flat_map(|d| d.text_from_tag(tag)).collect()
    }

    /// Names of documents where at least one entity's text disagrees with
    /// the underlying text. Documents loaded without text are skipped.
    pub fn misaligned_documents(&self) -> Vec<&str> {
        self.docs
            .iter()
            .filter(|d| {
                d.misaligned_entities()
                    .map(|bad| !bad.is_empty())
                    .unwrap_or(false)
            })
            .map(Document::name)
            .collect()
    }
}
