//! Classification of single `.ann` lines.
//!
//! The leading character of a line decides its record kind:
//!
//! | Prefix | Record |
//! |--------|--------|
//! | `T` | [`Entity`] |
//! | `R` | [`Relation`] |
//! | `E` | [`Event`] |
//! | `A`, `M` | [`Attribute`] (`M` is the legacy modification prefix) |
//! | `#` | [`Note`] |
//!
//! Fields are tab-separated; the second field is itself space-separated into
//! a type token and its positional arguments. Normalizations (`N`) and
//! equivalences (`*`) are recognized but not implemented.
//!
//! Parsing one line never affects another: callers log the returned
//! [`ParseError`] and move on.

use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

use crate::models::{Attribute, Entity, Event, Note, Offsets, RecordKind, Relation, Span};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,

    #[error("unrecognized line prefix {0:?}")]
    Unrecognized(char),

    #[error("{0} lines are not supported")]
    Unimplemented(&'static str),

    #[error("{kind} line is missing its {field}")]
    MissingField {
        kind: RecordKind,
        field: &'static str,
    },

    #[error("invalid span {0:?}")]
    InvalidSpan(String),

    #[error("invalid offset {value:?}: {source}")]
    InvalidOffset {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// One parsed annotation line.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnLine {
    Entity(Entity),
    Relation(Relation),
    Event(Event),
    Attribute(Attribute),
    Note(Note),
}

impl AnnLine {
    pub fn kind(&self) -> RecordKind {
        match self {
            AnnLine::Entity(_) => RecordKind::Entities,
            AnnLine::Relation(_) => RecordKind::Relations,
            AnnLine::Event(_) => RecordKind::Events,
            AnnLine::Attribute(_) => RecordKind::Attributes,
            AnnLine::Note(_) => RecordKind::Notes,
        }
    }
}

impl FromStr for AnnLine {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\n', '\r']);
        let first = line.chars().next().ok_or(ParseError::Empty)?;

        match first {
            'T' => parse_entity(line).map(AnnLine::Entity),
            'R' => parse_relation(line).map(AnnLine::Relation),
            'E' => parse_event(line).map(AnnLine::Event),
            'A' | 'M' => parse_attribute(line).map(AnnLine::Attribute),
            '#' => parse_note(line).map(AnnLine::Note),
            'N' => Err(ParseError::Unimplemented("normalization")),
            '*' => Err(ParseError::Unimplemented("equivalence")),
            other => Err(ParseError::Unrecognized(other)),
        }
    }
}

/// Parse a line, treating blank lines as "nothing here". This is the entry
/// point for input that may contain blank lines; `str::parse` reports them
/// as [`ParseError::Empty`].
pub fn parse_line(line: &str) -> Result<Option<AnnLine>, ParseError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    line.parse().map(Some)
}

/// Split into at most three tab fields: id, type-and-arguments, free text.
fn fields(line: &str) -> (&str, Option<&str>, Option<&str>) {
    let mut parts = line.splitn(3, '\t');
    let id = parts.next().unwrap_or_default();
    (id, parts.next(), parts.next())
}

fn require<'a>(
    value: Option<&'a str>,
    kind: RecordKind,
    field: &'static str,
) -> Result<&'a str, ParseError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ParseError::MissingField { kind, field }),
    }
}

fn parse_offset(value: &str) -> Result<usize, ParseError> {
    value.parse().map_err(|source| ParseError::InvalidOffset {
        value: value.to_string(),
        source,
    })
}

fn parse_range(fragment: &str) -> Result<Offsets, ParseError> {
    let mut bounds = fragment.split_whitespace();
    match (bounds.next(), bounds.next(), bounds.next()) {
        (Some(start), Some(end), None) => Ok((parse_offset(start)?, parse_offset(end)?)),
        _ => Err(ParseError::InvalidSpan(fragment.to_string())),
    }
}

/// `start end` or, for discontinuous mentions, `start end;start2 end2`.
fn parse_span(tokens: &[&str]) -> Result<Span, ParseError> {
    match tokens.len() {
        2 => Ok(Span::Contiguous((
            parse_offset(tokens[0])?,
            parse_offset(tokens[1])?,
        ))),
        3 => {
            let joined = tokens.join(" ");
            let mut fragments = joined.split(';');
            match (fragments.next(), fragments.next(), fragments.next()) {
                (Some(a), Some(b), None) => Ok(Span::Discontinuous(parse_range(a)?, parse_range(b)?)),
                _ => Err(ParseError::InvalidSpan(joined)),
            }
        }
        _ => Err(ParseError::InvalidSpan(tokens.join(" "))),
    }
}

fn parse_entity(line: &str) -> Result<Entity, ParseError> {
    let kind = RecordKind::Entities;
    let (name, body, text) = fields(line);
    let body = require(body, kind, "tag and span")?;
    let text = text.ok_or(ParseError::MissingField {
        kind,
        field: "text",
    })?;

    let tokens: Vec<&str> = body.split_whitespace().collect();
    let (tag, span) = tokens
        .split_first()
        .ok_or(ParseError::MissingField { kind, field: "tag" })?;

    Ok(Entity::new(name, *tag, parse_span(span)?, text))
}

fn parse_relation(line: &str) -> Result<Relation, ParseError> {
    let kind = RecordKind::Relations;
    let (name, body, _) = fields(line);
    let mut parts = require(body, kind, "tag and arguments")?.split_whitespace();

    let tag = require(parts.next(), kind, "tag")?;
    let arg1 = require(parts.next(), kind, "first argument")?;
    let arg2 = require(parts.next(), kind, "second argument")?;

    Ok(Relation {
        name: name.to_string(),
        tag: tag.to_string(),
        arg1: arg1.to_string(),
        arg2: arg2.to_string(),
    })
}

fn parse_event(line: &str) -> Result<Event, ParseError> {
    let kind = RecordKind::Events;
    let (name, body, _) = fields(line);
    let mut parts = require(body, kind, "type and arguments")?.split_whitespace();

    let head = require(parts.next(), kind, "type")?;
    let (tag, trigger) = head
        .split_once(':')
        .ok_or(ParseError::MissingField {
            kind,
            field: "trigger",
        })?;
    let trigger = require(Some(trigger), kind, "trigger")?;

    Ok(Event {
        name: name.to_string(),
        tag: tag.to_string(),
        trigger: trigger.to_string(),
        arguments: parts.map(str::to_string).collect(),
    })
}

fn parse_attribute(line: &str) -> Result<Attribute, ParseError> {
    let kind = RecordKind::Attributes;
    let (name, body, _) = fields(line);
    let mut parts = require(body, kind, "tag and target")?.split_whitespace();

    let tag = require(parts.next(), kind, "tag")?;
    let arguments: Vec<String> = parts.map(str::to_string).collect();
    if arguments.is_empty() {
        return Err(ParseError::MissingField {
            kind,
            field: "target",
        });
    }

    Ok(Attribute::new(name, tag, arguments))
}

fn parse_note(line: &str) -> Result<Note, ParseError> {
    let kind = RecordKind::Notes;
    let (name, body, text) = fields(line);
    let mut parts = require(body, kind, "tag and target")?.split_whitespace();

    let tag = require(parts.next(), kind, "tag")?;
    let target = require(parts.next(), kind, "target")?;

    Ok(Note {
        name: name.to_string(),
        tag: tag.to_string(),
        target: target.to_string(),
        text: text.unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(line: &str) -> Entity {
        match line.parse::<AnnLine>().unwrap() {
            AnnLine::Entity(e) => e,
            other => panic!("expected entity, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_contiguous_entity() {
        let ent = entity("T2\tLocation 10 23\tSouth America");
        assert_eq!(ent.name, "T2");
        assert_eq!(ent.tag, "Location");
        assert_eq!(ent.span, Span::Contiguous((10, 23)));
        assert_eq!(ent.text, "South America");
    }

    #[test]
    fn test_parse_discontinuous_entity() {
        let ent = entity("T3\tDrug 0 5;12 19\taspir tablets");
        assert_eq!(ent.span, Span::Discontinuous((0, 5), (12, 19)));
    }

    #[test]
    fn test_entity_round_trip() {
        for line in [
            "T2\tLocation 10 23\tSouth America",
            "T3\tDrug 0 5;12 19\taspir tablets",
            "T10\tPerson 0 0\t",
        ] {
            assert_eq!(entity(line).to_string(), line);
        }
    }

    #[test]
    fn test_entity_trailing_newline_stripped() {
        let ent = entity("T1\tOrg 0 4\tACME\r\n");
        assert_eq!(ent.text, "ACME");
    }

    #[test]
    fn test_parse_relation() {
        let line = "R1\tLives_In Arg1:T1 Arg2:T2";
        match line.parse::<AnnLine>().unwrap() {
            AnnLine::Relation(rel) => {
                assert_eq!(rel.tag, "Lives_In");
                assert_eq!(rel.arg1, "Arg1:T1");
                assert_eq!(rel.arg2, "Arg2:T2");
                assert_eq!(rel.to_string(), line);
            }
            other => panic!("expected relation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_event() {
        let line = "E1\tMarriage:T3 Person1:T1 Person2:T2";
        match line.parse::<AnnLine>().unwrap() {
            AnnLine::Event(ev) => {
                assert_eq!(ev.tag, "Marriage");
                assert_eq!(ev.trigger, "T3");
                assert_eq!(ev.arguments, vec!["Person1:T1", "Person2:T2"]);
                assert_eq!(ev.to_string(), line);
            }
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_attribute_and_modification() {
        for line in ["A1\tNegation T1", "M1\tNegation T1"] {
            match line.parse::<AnnLine>().unwrap() {
                AnnLine::Attribute(att) => {
                    assert_eq!(att.tag, "Negation");
                    assert_eq!(att.target(), "T1");
                    assert_eq!(att.kind, crate::models::AttributeKind::Binary);
                }
                other => panic!("expected attribute, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_note_with_and_without_text() {
        match "#1\tAnnotatorNotes T1\tcheck this".parse::<AnnLine>().unwrap() {
            AnnLine::Note(n) => {
                assert_eq!(n.target, "T1");
                assert_eq!(n.text, "check this");
            }
            other => panic!("expected note, got {:?}", other),
        }
        match "#2\tAnnotatorNotes T4".parse::<AnnLine>().unwrap() {
            AnnLine::Note(n) => assert_eq!(n.text, ""),
            other => panic!("expected note, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_line_is_none() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   \n").unwrap(), None);
    }

    #[test]
    fn test_empty_line_from_str_is_empty_error() {
        assert_eq!("".parse::<AnnLine>(), Err(ParseError::Empty));
        assert_eq!("\r\n".parse::<AnnLine>(), Err(ParseError::Empty));
    }

    #[test]
    fn test_unrecognized_prefix() {
        assert_eq!(
            "X1\tFoo bar".parse::<AnnLine>(),
            Err(ParseError::Unrecognized('X'))
        );
        assert_eq!(
            "N1\tReference T1 Wikipedia:534366\tBarack Obama".parse::<AnnLine>(),
            Err(ParseError::Unimplemented("normalization"))
        );
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            "T1\tLocation 10 23".parse::<AnnLine>(),
            Err(ParseError::MissingField { field: "text", .. })
        ));
        assert!(matches!(
            "T1\tLocation 10\tx".parse::<AnnLine>(),
            Err(ParseError::InvalidSpan(_))
        ));
        assert!(matches!(
            "T1\tLocation ten 23\tx".parse::<AnnLine>(),
            Err(ParseError::InvalidOffset { .. })
        ));
        assert!(matches!(
            "R1\tLives_In Arg1:T1".parse::<AnnLine>(),
            Err(ParseError::MissingField { .. })
        ));
        assert!(matches!(
            "E1\tMarriage T1".parse::<AnnLine>(),
            Err(ParseError::MissingField { field: "trigger", .. })
        ));
        assert!(matches!(
            "A1\tNegation".parse::<AnnLine>(),
            Err(ParseError::MissingField { field: "target", .. })
        ));
        assert!(matches!(
            "#1".parse::<AnnLine>(),
            Err(ParseError::MissingField { .. })
        ));
    }
}
