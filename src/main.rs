//! # Peek CLI (`peek`)
//!
//! The `peek` binary drives the library over a brat corpus: statistics,
//! consistency checks, and reshaping documents into sentences or merged
//! files.
//!
//! ## Usage
//!
//! ```bash
//! peek --config ./peek.toml <command>
//! peek --root ./corpus [--text] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `peek stats` | Tag counts for the whole corpus |
//! | `peek check` | List empty and misaligned documents |
//! | `peek show <name>` | Print one document in `.ann` form |
//! | `peek segment <name>` | Write one document per text line |
//! | `peek merge <dir>` | Merge every document under a directory into one |
//! | `peek split-tags` | Split compound tags into two annotation sets |
//!
//! Logs go to stderr and are filtered through `RUST_LOG` (default
//! `peek=info`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use peek::config::{self, CollectionMode, Config};
use peek::corpus::Corpus;
use peek::document::Document;
use peek::models::RecordKind;
use peek::segment::{merge, segment};
use peek::stats::print_corpus_stats;
use peek::write::{split_tag_axes, write_ann_file, write_txt_file};

/// Peek, a toolkit for brat standoff annotation corpora.
///
/// The corpus is described either by a TOML configuration file or, for
/// quick looks, by `--root` alone.
#[derive(Parser)]
#[command(
    name = "peek",
    about = "Peek, a toolkit for brat standoff annotation corpora",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./peek.toml")]
    config: PathBuf,

    /// Corpus root directory. Replaces the configuration file.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Load the `.txt` file next to every `.ann` file.
    #[arg(long, global = true)]
    text: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print tag statistics for the corpus.
    Stats {
        /// Emit the statistics as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Report documents without entities and documents whose entity text
    /// does not match the underlying text.
    ///
    /// The alignment check needs text, so `--text` (or
    /// `corpus.include_text`) should be set.
    Check,

    /// Print one document in `.ann` form.
    Show {
        /// Document name (file stem).
        name: String,

        /// Restrict the lookup to one collection.
        #[arg(long)]
        collection: Option<String>,
    },

    /// Split a document into one document per text line and write them
    /// under `<output.dir>/<name>/`.
    Segment {
        /// Document name (file stem).
        name: String,

        /// Restrict the lookup to one collection.
        #[arg(long)]
        collection: Option<String>,
    },

    /// Merge every document found under a directory into a single
    /// document, written under the output directory.
    ///
    /// Needs text, so `--text` (or `corpus.include_text`) must be set.
    Merge {
        /// Directory holding the documents to merge.
        dir: PathBuf,

        /// Name of the merged document.
        #[arg(long, default_value = "merged")]
        name: String,
    },

    /// Split compound tags (`AXIS1-AXIS2`) into two annotation sets,
    /// written under `<output.dir>/axis1/` and `<output.dir>/axis2/`,
    /// keeping each document's subfolder.
    SplitTags {
        /// Separator between the two tag parts.
        #[arg(long, default_value = "-")]
        separator: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("peek=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.root {
        Some(root) => Config::for_root(root),
        None => config::load_config(&cli.config)?,
    };
    if cli.text {
        cfg.corpus.include_text = true;
    }

    match cli.command {
        Commands::Stats { json } => {
            let corpus = load_corpus(&cfg)?;
            if json {
                println!("{}", serde_json::to_string_pretty(corpus.stats())?);
            } else {
                print_corpus_stats(&corpus);
            }
        }
        Commands::Check => {
            let corpus = load_corpus(&cfg)?;
            run_check(&corpus, cfg.corpus.include_text);
        }
        Commands::Show { name, collection } => {
            let corpus = load_corpus(&cfg)?;
            let doc = find(&corpus, &name, collection.as_deref())?;
            run_show(doc);
        }
        Commands::Segment { name, collection } => {
            let corpus = load_corpus(&cfg)?;
            let doc = find(&corpus, &name, collection.as_deref())?;
            run_segment(&cfg, doc)?;
        }
        Commands::Merge { dir, name } => {
            run_merge(&cfg, &dir, &name)?;
        }
        Commands::SplitTags { separator } => {
            let corpus = load_corpus(&cfg)?;
            run_split_tags(&cfg, &corpus, &separator)?;
        }
    }

    Ok(())
}

fn load_corpus(cfg: &Config) -> Result<Corpus> {
    load_corpus_at(cfg, &cfg.corpus.root)
}

fn load_corpus_at(cfg: &Config, root: &Path) -> Result<Corpus> {
    let mut corpus = Corpus::build_with(
        root,
        &cfg.corpus.discover_options(),
        &cfg.corpus.load_options(),
    )?;

    let counts = match cfg.collections.mode {
        CollectionMode::None => return Ok(corpus),
        CollectionMode::Subfolder => corpus.collections_by_subfolder(),
        CollectionMode::List => {
            let labels: Vec<&str> = cfg.collections.labels.iter().map(String::as_str).collect();
            corpus.collections_by_list(&labels)
        }
    };
    for (label, docs) in &counts {
        tracing::debug!(collection = %label, docs, "collection assigned");
    }
    Ok(corpus)
}

fn find<'a>(corpus: &'a Corpus, name: &str, collection: Option<&str>) -> Result<&'a Document> {
    corpus.by_name(name, collection).with_context(|| match collection {
        Some(c) => format!("Document '{}' not found in collection '{}'", name, c),
        None => format!("Document '{}' not found", name),
    })
}

fn run_check(corpus: &Corpus, with_text: bool) {
    let empty = corpus.empty_documents();
    println!("Empty documents: {}", empty.len());
    for doc in &empty {
        println!("  {}", doc.path().display());
    }

    if !with_text {
        println!("Alignment: skipped (text not loaded)");
        return;
    }

    let misaligned = corpus.misaligned_documents();
    println!("Misaligned documents: {}", misaligned.len());
    for name in misaligned {
        println!("  {}", name);
    }
}

fn run_show(doc: &Document) {
    println!("# {} ({})", doc.name(), doc.path().display());
    if let Some(collection) = doc.collection() {
        println!("# collection: {}", collection);
    }
    for kind in RecordKind::ALL {
        println!("# {}: {}", kind, doc.anns().len(kind));
    }
    print!("{}", doc.to_ann_string());
}

fn run_segment(cfg: &Config, doc: &Document) -> Result<()> {
    let dir = cfg.output.dir.join(doc.name());
    let mut written = 0usize;
    for sentence in segment(doc)? {
        write_ann_file(&sentence, &dir, &cfg.corpus.ann_extension)?;
        write_txt_file(&sentence, &dir, &cfg.corpus.text_extension)?;
        written += 1;
    }
    println!("Wrote {} sentences to {}", written, dir.display());
    Ok(())
}

fn run_merge(cfg: &Config, dir: &Path, name: &str) -> Result<()> {
    if !cfg.corpus.include_text {
        bail!("merge needs document text: pass --text or set corpus.include_text");
    }

    let corpus = load_corpus_at(cfg, dir)?;
    if corpus.docs().is_empty() {
        bail!("No documents found under {}", dir.display());
    }

    let merged = merge(name, corpus.docs())?;
    let path = write_ann_file(&merged, &cfg.output.dir, &cfg.corpus.ann_extension)?;
    write_txt_file(&merged, &cfg.output.dir, &cfg.corpus.text_extension)?;
    println!(
        "Merged {} documents ({} entities) into {}",
        corpus.docs().len(),
        merged.entities().len(),
        path.display()
    );
    Ok(())
}

fn run_split_tags(cfg: &Config, corpus: &Corpus, separator: &str) -> Result<()> {
    let first_dir = cfg.output.dir.join("axis1");
    let second_dir = cfg.output.dir.join("axis2");

    for doc in corpus.docs() {
        let (first, second) = split_tag_axes(doc, separator);
        let subfolder = relative_dir(corpus.path(), doc.path());
        for (split, dir) in [(&first, &first_dir), (&second, &second_dir)] {
            let dir = dir.join(subfolder);
            write_ann_file(split, &dir, &cfg.corpus.ann_extension)?;
            if cfg.corpus.include_text {
                write_txt_file(split, &dir, &cfg.corpus.text_extension)?;
            }
        }
    }

    println!(
        "Split {} documents into {} and {}",
        corpus.docs().len(),
        first_dir.display(),
        second_dir.display()
    );
    Ok(())
}

/// Folder of `path` relative to the corpus root, empty for top-level files.
fn relative_dir<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .unwrap_or(Path::new(""))
}
