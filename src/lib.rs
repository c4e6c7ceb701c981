//! # Peek
//!
//! Reading, checking and reshaping corpora annotated in the brat standoff
//! format.
//!
//! A brat document is a pair of files: `name.txt` holds the raw text and
//! `name.ann` holds one annotation per line (text-bound entities, relations,
//! events, attributes and notes), each anchored to character offsets in the
//! text. Peek parses these files into typed records, links every entity to
//! the records that mention it, aggregates tag statistics over a whole
//! corpus, and can split documents into per-line sentences and merge them
//! back.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐
//! │ discover │──▶│  parse   │──▶│ document  │──▶│  corpus  │
//! │ walk+glob│   │ AnnLine  │   │ link+stats│   │ aggregate│
//! └──────────┘   └──────────┘   └─────┬─────┘   └──────────┘
//!                                     │
//!                       ┌─────────────┼─────────────┐
//!                       ▼             ▼             ▼
//!                  ┌─────────┐   ┌─────────┐   ┌─────────┐
//!                  │ overlap │   │ segment │   │  write  │
//!                  └─────────┘   └─────────┘   └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! peek --root ./corpus stats            # tag overview
//! peek --root ./corpus check            # empty and misaligned documents
//! peek --config peek.toml segment doc1  # one document per text line
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Annotation record types |
//! | [`parse`] | Line-level `.ann` parser |
//! | [`document`] | One parsed document with entity links |
//! | [`stats`] | Tag and text-frequency statistics |
//! | [`overlap`] | Span overlap classification |
//! | [`discover`] | Annotation file discovery |
//! | [`corpus`] | Corpus aggregation and collections |
//! | [`segment`] | Sentence segmentation and merge |
//! | [`write`] | Writing documents back to brat files |

pub mod config;
pub mod corpus;
pub mod discover;
pub mod document;
pub mod models;
pub mod overlap;
pub mod parse;
pub mod segment;
pub mod stats;
pub mod write;

pub use corpus::Corpus;
pub use document::{Annotations, Document, DocumentBuilder, LoadOptions};
pub use models::{Attribute, Entity, Event, Note, RecordKind, Relation, Span};
pub use overlap::{compare_overlap, OverlapKind};
pub use parse::{parse_line, AnnLine, ParseError};
pub use segment::{merge, segment};
