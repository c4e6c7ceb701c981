//! Core annotation records parsed from brat standoff files.
//!
//! Every record type knows how to print itself back as the canonical `.ann`
//! line it was read from (see the [`std::fmt::Display`] impls). Records are
//! never mutated after parsing; transformations such as segmentation build
//! new records instead.

use std::fmt;

use serde::Serialize;

/// A single `(start, end)` character-offset pair.
pub type Offsets = (usize, usize);

/// The five record kinds a [`crate::document::Document`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Entities,
    Relations,
    Events,
    Attributes,
    Notes,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Entities,
        RecordKind::Relations,
        RecordKind::Events,
        RecordKind::Attributes,
        RecordKind::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Entities => "entities",
            RecordKind::Relations => "relations",
            RecordKind::Events => "events",
            RecordKind::Attributes => "attributes",
            RecordKind::Notes => "notes",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character span of an entity: one range, or two for a discontinuous mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Span {
    Contiguous(Offsets),
    Discontinuous(Offsets, Offsets),
}

impl Span {
    /// The first fragment. Overlap comparison only ever looks at this one.
    pub fn first(&self) -> Offsets {
        match *self {
            Span::Contiguous(range) | Span::Discontinuous(range, _) => range,
        }
    }

    pub fn fragments(&self) -> Vec<Offsets> {
        match *self {
            Span::Contiguous(range) => vec![range],
            Span::Discontinuous(a, b) => vec![a, b],
        }
    }

    pub fn is_discontinuous(&self) -> bool {
        matches!(self, Span::Discontinuous(..))
    }

    /// Lowest start offset over all fragments.
    pub fn start(&self) -> usize {
        self.fragments().iter().map(|r| r.0).min().unwrap_or(0)
    }

    /// Highest end offset over all fragments.
    pub fn end(&self) -> usize {
        self.fragments().iter().map(|r| r.1).max().unwrap_or(0)
    }

    /// True when every fragment lies inside `[from, to]`.
    pub fn within(&self, from: usize, to: usize) -> bool {
        self.fragments().iter().all(|&(s, e)| s >= from && e <= to)
    }

    /// Apply `f` to every offset, keeping the span's shape.
    pub fn map_offsets(&self, f: impl Fn(usize) -> usize) -> Span {
        match *self {
            Span::Contiguous((s, e)) => Span::Contiguous((f(s), f(e))),
            Span::Discontinuous((s1, e1), (s2, e2)) => {
                Span::Discontinuous((f(s1), f(e1)), (f(s2), f(e2)))
            }
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Span::Contiguous((s, e)) => write!(f, "{} {}", s, e),
            Span::Discontinuous((s1, e1), (s2, e2)) => write!(f, "{} {};{} {}", s1, e1, s2, e2),
        }
    }
}

/// Text-bound annotation (`T` lines).
///
/// Equality ignores the identifier: two entities are equal when tag, span
/// and covered text all match.
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    pub name: String,
    pub tag: String,
    pub span: Span,
    pub text: String,
}

impl Entity {
    pub fn new(
        name: impl Into<String>,
        tag: impl Into<String>,
        span: Span,
        text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            span,
            text: text.into(),
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.span == other.span && self.text == other.text
    }
}

impl Eq for Entity {}

impl std::hash::Hash for Entity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
        self.span.hash(state);
        self.text.hash(state);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{} {}\t{}", self.name, self.tag, self.span, self.text)
    }
}

/// Strip the `role:` prefix from an argument such as `Arg1:T3`.
pub fn argument_target(argument: &str) -> &str {
    argument.rsplit(':').next().unwrap_or(argument)
}

/// Binary relation between two annotations (`R` lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub name: String,
    pub tag: String,
    /// `role:id`, kept unparsed.
    pub arg1: String,
    pub arg2: String,
}

impl Relation {
    pub fn targets(&self) -> [&str; 2] {
        [argument_target(&self.arg1), argument_target(&self.arg2)]
    }

    pub fn involves(&self, id: &str) -> bool {
        self.targets().contains(&id)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{} {} {}", self.name, self.tag, self.arg1, self.arg2)
    }
}

/// Event anchored on a trigger entity (`E` lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    pub tag: String,
    pub trigger: String,
    pub arguments: Vec<String>,
}

impl Event {
    pub fn involves(&self, id: &str) -> bool {
        self.trigger == id || self.arguments.iter().any(|a| argument_target(a) == id)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}:{}", self.name, self.tag, self.trigger)?;
        for arg in &self.arguments {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeKind {
    /// Flag that is either present or absent on the target.
    Binary,
    /// Second argument is the chosen value.
    MultiValued,
}

impl AttributeKind {
    pub fn from_arity(arguments: usize) -> Self {
        if arguments == 1 {
            AttributeKind::Binary
        } else {
            AttributeKind::MultiValued
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Binary => "binary",
            AttributeKind::MultiValued => "multi-valued",
        }
    }
}

/// Attribute or legacy modification (`A` / `M` lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub tag: String,
    /// `arguments[0]` is always the target identifier.
    pub arguments: Vec<String>,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn new(name: impl Into<String>, tag: impl Into<String>, arguments: Vec<String>) -> Self {
        let kind = AttributeKind::from_arity(arguments.len());
        Self {
            name: name.into(),
            tag: tag.into(),
            arguments,
            kind,
        }
    }

    pub fn target(&self) -> &str {
        self.arguments.first().map(String::as_str).unwrap_or_default()
    }

    pub fn value(&self) -> Option<&str> {
        self.arguments.get(1).map(String::as_str)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{} {}", self.name, self.tag, self.arguments.join(" "))
    }
}

/// Annotator note attached to another record (`#` lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub name: String,
    pub tag: String,
    pub target: String,
    pub text: String,
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{} {}", self.name, self.tag, self.target)?;
        if !self.text.is_empty() {
            write!(f, "\t{}", self.text)?;
        }
        Ok(())
    }
}
