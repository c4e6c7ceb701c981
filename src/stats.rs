//! Tag and text-frequency statistics.
//!
//! Documents derive an [`AnnotationStats`] from their records when they are
//! built; a corpus sums the statistics of its documents. Used by
//! `peek stats` to give an overview of what a corpus contains.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::corpus::Corpus;
use crate::document::Annotations;
use crate::models::RecordKind;

/// `tag → occurrences`.
pub type TagCounter = BTreeMap<String, usize>;

/// `tag → (text → occurrences)`.
pub type TextFrequency = BTreeMap<String, BTreeMap<String, usize>>;

/// One value per record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerKind<T> {
    pub entities: T,
    pub relations: T,
    pub events: T,
    pub attributes: T,
    pub notes: T,
}

impl<T> PerKind<T> {
    pub fn get(&self, kind: RecordKind) -> &T {
        match kind {
            RecordKind::Entities => &self.entities,
            RecordKind::Relations => &self.relations,
            RecordKind::Events => &self.events,
            RecordKind::Attributes => &self.attributes,
            RecordKind::Notes => &self.notes,
        }
    }

    pub fn get_mut(&mut self, kind: RecordKind) -> &mut T {
        match kind {
            RecordKind::Entities => &mut self.entities,
            RecordKind::Relations => &mut self.relations,
            RecordKind::Events => &mut self.events,
            RecordKind::Attributes => &mut self.attributes,
            RecordKind::Notes => &mut self.notes,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordKind, &T)> {
        RecordKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

/// Derived counts for a document or a whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationStats {
    pub counts: PerKind<TagCounter>,
    /// Entity texts per tag, as written.
    pub text_freq: TextFrequency,
    /// Entity texts per tag, lowercased.
    pub text_freq_lower: TextFrequency,
}

impl AnnotationStats {
    pub fn from_annotations(anns: &Annotations) -> Self {
        let mut stats = AnnotationStats::default();

        let tags: PerKind<Vec<&str>> = PerKind {
            entities: anns.entities.iter().map(|a| a.tag.as_str()).collect(),
            relations: anns.relations.iter().map(|a| a.tag.as_str()).collect(),
            events: anns.events.iter().map(|a| a.tag.as_str()).collect(),
            attributes: anns.attributes.iter().map(|a| a.tag.as_str()).collect(),
            notes: anns.notes.iter().map(|a| a.tag.as_str()).collect(),
        };
        for (kind, kind_tags) in tags.iter() {
            let counter = stats.counts.get_mut(kind);
            for tag in kind_tags {
                *counter.entry(tag.to_string()).or_default() += 1;
            }
        }

        for ent in &anns.entities {
            *stats
                .text_freq
                .entry(ent.tag.clone())
                .or_default()
                .entry(ent.text.clone())
                .or_default() += 1;
            *stats
                .text_freq_lower
                .entry(ent.tag.clone())
                .or_default()
                .entry(ent.text.to_lowercase())
                .or_default() += 1;
        }

        stats
    }

    /// Add another set of statistics into this one.
    pub fn absorb(&mut self, other: &AnnotationStats) {
        for kind in RecordKind::ALL {
            let counter = self.counts.get_mut(kind);
            for (tag, n) in other.counts.get(kind) {
                *counter.entry(tag.clone()).or_default() += n;
            }
        }
        merge_frequency(&mut self.text_freq, &other.text_freq);
        merge_frequency(&mut self.text_freq_lower, &other.text_freq_lower);
    }

    /// Sorted distinct tags of one record kind.
    pub fn labels(&self, kind: RecordKind) -> Vec<&str> {
        self.counts.get(kind).keys().map(String::as_str).collect()
    }

    pub fn count(&self, kind: RecordKind, tag: &str) -> usize {
        self.counts.get(kind).get(tag).copied().unwrap_or(0)
    }

    pub fn total(&self, kind: RecordKind) -> usize {
        self.counts.get(kind).values().sum()
    }
}

fn merge_frequency(into: &mut TextFrequency, from: &TextFrequency) {
    for (tag, texts) in from {
        let target = into.entry(tag.clone()).or_default();
        for (text, n) in texts {
            *target.entry(text.clone()).or_default() += n;
        }
    }
}

/// Print a corpus overview: document count, totals per kind, per-tag
/// entity counts with per-document averages.
pub fn print_corpus_stats(corpus: &Corpus) {
    let stats = corpus.stats();
    let docs = corpus.docs().len();

    println!("Corpus {}", corpus.name());
    println!("================================");
    println!();
    println!("  Root:        {}", corpus.path().display());
    println!("  Documents:   {}", docs);
    println!("  Empty:       {}", corpus.empty_documents().len());
    if !corpus.collections().is_empty() {
        let labels: Vec<&str> = corpus.collections().iter().map(String::as_str).collect();
        println!("  Collections: {}", labels.join(", "));
    }
    println!();

    for (kind, counter) in stats.counts.iter() {
        println!("  {:<12} {}", format!("{}:", kind), counter.values().sum::<usize>());
    }

    let entity_labels = stats.labels(RecordKind::Entities);
    if !entity_labels.is_empty() {
        println!();
        println!("  By entity tag:");
        println!("  {:<32} {:>8} {:>10}", "TAG", "TOTAL", "AVG/DOC");
        println!("  {}", "-".repeat(52));
        for label in entity_labels {
            let total = stats.count(RecordKind::Entities, label);
            println!(
                "  {:<32} {:>8} {:>10.2}",
                label,
                total,
                average(total, docs)
            );
        }
    }

    println!();
}

fn average(total: usize, docs: usize) -> f64 {
    if docs == 0 {
        0.0
    } else {
        total as f64 / docs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, Span};

    fn annotations(tags: &[(&str, &str)]) -> Annotations {
        let mut anns = Annotations::default();
        for (i, (tag, text)) in tags.iter().enumerate() {
            anns.entities.push(Entity::new(
                format!("T{}", i + 1),
                *tag,
                Span::Contiguous((i * 10, i * 10 + text.chars().count())),
                *text,
            ));
        }
        anns
    }

    #[test]
    fn test_tag_counts() {
        let stats = AnnotationStats::from_annotations(&annotations(&[
            ("A", "x"),
            ("A", "y"),
            ("B", "z"),
        ]));
        let expected: TagCounter = [("A".to_string(), 2), ("B".to_string(), 1)].into();
        assert_eq!(stats.counts.entities, expected);
        assert!(stats.counts.relations.is_empty());
        assert_eq!(stats.total(RecordKind::Entities), 3);
    }

    #[test]
    fn test_text_frequency_original_and_lowercase() {
        let stats = AnnotationStats::from_annotations(&annotations(&[
            ("Loc", "Paris"),
            ("Loc", "paris"),
            ("Loc", "Paris"),
        ]));
        assert_eq!(stats.text_freq["Loc"]["Paris"], 2);
        assert_eq!(stats.text_freq["Loc"]["paris"], 1);
        assert_eq!(stats.text_freq_lower["Loc"]["paris"], 3);
        assert_eq!(stats.text_freq_lower["Loc"].len(), 1);
    }

    #[test]
    fn test_absorb_sums_counts() {
        let mut total = AnnotationStats::from_annotations(&annotations(&[("A", "x"), ("B", "y")]));
        let other = AnnotationStats::from_annotations(&annotations(&[("A", "x"), ("C", "w")]));
        total.absorb(&other);
        assert_eq!(total.count(RecordKind::Entities, "A"), 2);
        assert_eq!(total.count(RecordKind::Entities, "B"), 1);
        assert_eq!(total.count(RecordKind::Entities, "C"), 1);
        assert_eq!(total.text_freq["A"]["x"], 2);
        assert_eq!(total.labels(RecordKind::Entities), vec!["A", "B", "C"]);
    }
}
