//! Dotted path parsing.
//!
//! Paths look like `results.models[2].r2`: segments split on `.`, each
//! optionally carrying a bracketed list index.

use std::sync::LazyLock;

use regex::Regex;
use toml::{Table, Value};

use crate::LookupError;

static INDEXED_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\[\]]+)\[(\d+)\]$").unwrap());

/// One segment of a dotted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub key: &'a str,
    pub index: Option<usize>,
}

/// Parse a single path segment, splitting off a trailing `[n]` index.
///
/// Segments whose brackets do not form a trailing integer index are treated
/// as plain keys.
pub(crate) fn parse_segment<'a>(path: &str, segment: &'a str) -> Result<Segment<'a>, LookupError> {
    let Some(caps) = INDEXED_SEGMENT_RE.captures(segment) else {
        return Ok(Segment {
            key: segment,
            index: None,
        });
    };

    let key = caps.get(1).map_or(segment, |m| m.as_str());
    let digits = caps.get(2).map_or("", |m| m.as_str());
    let index = digits
        .parse::<usize>()
        .map_err(|_| LookupError::InvalidSegment {
            path: path.to_owned(),
            segment: segment.to_owned(),
        })?;

    Ok(Segment {
        key,
        index: Some(index),
    })
}

/// Flat dotted lookup into a plain TOML table.
///
/// Used for `config.` references, which resolve against project settings
/// without any record or metadata handling.
///
/// # Examples
///
/// ```
/// use repro_store::lookup_dotted;
///
/// let table: toml::Table = toml::from_str("[project]\nname = \"Study\"").unwrap();
/// let value = lookup_dotted(&table, "project.name").unwrap();
/// assert_eq!(value.as_str(), Some("Study"));
/// assert!(lookup_dotted(&table, "project.missing").is_none());
/// ```
#[must_use]
pub fn lookup_dotted<'a>(table: &'a Table, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = table.get(segments.next()?)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}
