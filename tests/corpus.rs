use std::fs;
use std::path::Path;

use peek::discover::DiscoverOptions;
use peek::document::LoadOptions;
use peek::segment::{merge, segment};
use peek::{Corpus, Document, OverlapKind, RecordKind};
use tempfile::TempDir;

fn write_doc(dir: &Path, name: &str, ann: &str, text: Option<&str>) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(format!("{}.ann", name)), ann).unwrap();
    if let Some(text) = text {
        fs::write(dir.join(format!("{}.txt", name)), text).unwrap();
    }
}

fn setup_corpus() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write_doc(
        &root.join("negation"),
        "report1",
        "T1\tNEG 0 2\tNo\n\
T2\tSYMPTOM 7 12\tfever\n\
R1\tScope Arg1:T1 Arg2:T2\n\
A1\tCertain T2\n\
#1\tAnnotatorNotes T2\tchecked\n",
        Some("No has fever.\nOther line\n"),
    );
    write_doc(
        &root.join("meddocan"),
        "report2",
        "T1\tTERRITORIO 0 6\tMadrid\n\
T2\tTERRITORIO 10 13\tXXX\n\
X9\tgarbage line\n",
        Some("Madrid es ok.\n"),
    );
    write_doc(&root.join("meddocan"), "empty", "", Some("nothing here\n"));
    tmp
}

fn load(root: &Path, include_text: bool) -> Corpus {
    let load = LoadOptions {
        include_text,
        ..LoadOptions::default()
    };
    Corpus::build_with(root, &DiscoverOptions::default(), &load).unwrap()
}

#[test]
fn test_corpus_aggregates_all_documents() {
    let tmp = setup_corpus();
    let corpus = load(tmp.path(), false);

    assert_eq!(corpus.docs().len(), 3);
    let stats = corpus.stats();
    assert_eq!(stats.count(RecordKind::Entities, "TERRITORIO"), 2);
    assert_eq!(stats.count(RecordKind::Relations, "Scope"), 1);
    assert_eq!(stats.count(RecordKind::Attributes, "Certain"), 1);
    assert_eq!(stats.count(RecordKind::Notes, "AnnotatorNotes"), 1);
    assert_eq!(stats.text_freq_lower["NEG"]["no"], 1);
    assert_eq!(
        corpus.labels(RecordKind::Entities),
        vec!["NEG", "SYMPTOM", "TERRITORIO"]
    );
}

#[test]
fn test_malformed_lines_are_skipped() {
    let tmp = setup_corpus();
    let corpus = load(tmp.path(), false);
    let doc = corpus.by_name("report2", None).unwrap();
    assert_eq!(doc.entities().len(), 2);
    assert_eq!(doc.anns().len(RecordKind::Relations), 0);
}

#[test]
fn test_links_resolve_from_disk() {
    let tmp = setup_corpus();
    let doc = Document::parse(&tmp.path().join("negation/report1.ann")).unwrap();

    assert_eq!(doc.relations_of("T1").len(), 1);
    assert_eq!(doc.relations_of("T2").len(), 1);
    assert_eq!(doc.attributes_of("T2")[0].tag, "Certain");
    assert_eq!(doc.notes_of("T2")[0].text, "checked");
    assert!(doc.attributes_of("T1").is_empty());
    assert!(doc.text().is_none());
}

#[test]
fn test_collections_and_lookup() {
    let tmp = setup_corpus();
    let mut corpus = load(tmp.path(), false);
    let counts = corpus.collections_by_subfolder();

    assert_eq!(counts["meddocan"], 2);
    assert_eq!(counts["negation"], 1);
    assert_eq!(
        corpus.by_name("empty", Some("meddocan")).unwrap().name(),
        "empty"
    );
    assert!(corpus.by_name("empty", Some("negation")).is_none());
    let empty: Vec<&str> = corpus.empty_documents().iter().map(|d| d.name()).collect();
    assert_eq!(empty, vec!["empty"]);
}

#[test]
fn test_alignment_check_needs_text() {
    let tmp = setup_corpus();

    let without = load(tmp.path(), false);
    assert!(without.misaligned_documents().is_empty());

    let with = load(tmp.path(), true);
    assert_eq!(with.misaligned_documents(), vec!["report2"]);
}

#[test]
fn test_missing_text_file_still_loads() {
    let tmp = TempDir::new().unwrap();
    write_doc(tmp.path(), "lonely", "T1\tX 0 1\ta\n", None);
    let corpus = load(tmp.path(), true);
    assert_eq!(corpus.docs().len(), 1);
    assert!(corpus.docs()[0].text().is_none());
}

#[test]
fn test_missing_root_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = Corpus::build(&tmp.path().join("nope"), false);
    assert!(result.is_err());
}

#[test]
fn test_segment_and_merge_from_disk() {
    let tmp = setup_corpus();
    let corpus = load(tmp.path(), true);
    let doc = corpus.by_name("report1", None).unwrap();

    let sentences: Vec<Document> = segment(doc).unwrap().collect();
    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0].entities().len(), 2);
    assert_eq!(sentences[0].relations_of("T1").len(), 1);
    assert!(sentences[1].is_empty());

    let merged = merge("report1_merged", &sentences).unwrap();
    assert_eq!(merged.full_text(), doc.full_text());
    assert_eq!(merged.entities().len(), 2);
    assert!(merged.misaligned_entities().unwrap().is_empty());
}

#[test]
fn test_merge_refuses_documents_loaded_without_text() {
    let tmp = setup_corpus();
    let corpus = load(tmp.path(), false);
    assert!(merge("all", corpus.docs()).is_err());
}

#[test]
fn test_crlf_text_from_disk_segments_and_merges() {
    let tmp = TempDir::new().unwrap();
    write_doc(
        tmp.path(),
        "d",
        "T1\tX 0 2\tab\r\nT2\tY 3 5\tcd\r\n",
        Some("ab\r\ncd\r\n"),
    );
    let corpus = load(tmp.path(), true);
    assert!(corpus.misaligned_documents().is_empty());

    let doc = &corpus.docs()[0];
    let sentences: Vec<Document> = segment(doc).unwrap().collect();
    let counts: Vec<usize> = sentences.iter().map(|d| d.entities().len()).collect();
    assert_eq!(counts, vec![1, 1]);
    assert_eq!(merge("d", &sentences).unwrap().entities().len(), 2);
}

#[test]
fn test_overlap_between_parsed_entities() {
    let doc = Document::from_ann_str(
        Path::new("x.ann"),
        "T1\tA 0 10\tabcdefghij\nT2\tB 2 5\tcde\nT3\tC 8 14\tijklmn\n",
    );
    let e = doc.entities();
    assert_eq!(e[0].compare_overlap(&e[1]), Some(OverlapKind::NestedBigger));
    assert_eq!(e[1].compare_overlap(&e[0]), Some(OverlapKind::NestedSmaller));
    assert_eq!(e[0].compare_overlap(&e[2]), Some(OverlapKind::StartsBefore));
    assert_eq!(e[1].compare_overlap(&e[2]), None);
}

#[test]
fn test_target_subfolder_is_discovered() {
    let tmp = TempDir::new().unwrap();
    write_doc(&tmp.path().join("target"), "a", "T1\tX 0 1\ta\n", None);
    write_doc(tmp.path(), "b", "T1\tX 0 1\tb\n", None);
    let corpus = load(tmp.path(), false);
    let names: Vec<&str> = corpus.docs().iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["b", "a"]);
}
