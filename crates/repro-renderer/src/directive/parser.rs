//! Directive token scanning.
//!
//! Recognizes `\INSERT{arg}` and its `LINK`, `FILE`, `BADGE` and `WITHBADGE`
//! variants. Arguments cannot contain braces.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\INSERT(LINK|FILE|BADGE|WITHBADGE)?\{([^{}]*)\}").unwrap());

/// Kind of an insertion directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// `\INSERT{}`: the value's text.
    Plain,
    /// `\INSERTLINK{}`: the value as a hyperlink to its source.
    Link,
    /// `\INSERTFILE{}`: copy the file and reference the staged copy.
    File,
    /// `\INSERTBADGE{}`: a source attribution badge.
    Badge,
    /// `\INSERTWITHBADGE{}`: the value followed by a badge row.
    WithBadge,
}

impl DirectiveKind {
    fn from_suffix(suffix: Option<&str>) -> Self {
        match suffix {
            Some("LINK") => Self::Link,
            Some("FILE") => Self::File,
            Some("BADGE") => Self::Badge,
            Some("WITHBADGE") => Self::WithBadge,
            _ => Self::Plain,
        }
    }

    /// Whether substitution needs a source URL in the entry metadata.
    #[must_use]
    pub fn requires_url(self) -> bool {
        matches!(self, Self::Link | Self::Badge | Self::WithBadge)
    }

    /// Marker word as written in documents.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Plain => "INSERT",
            Self::Link => "INSERTLINK",
            Self::File => "INSERTFILE",
            Self::Badge => "INSERTBADGE",
            Self::WithBadge => "INSERTWITHBADGE",
        }
    }
}

/// A directive occurrence in a text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveToken<'a> {
    pub kind: DirectiveKind,
    /// Byte range of the whole token in the scanned text.
    pub span: Range<usize>,
    /// The token exactly as written.
    pub raw: &'a str,
    /// Lookup key after quote normalization.
    pub argument: String,
}

impl DirectiveToken<'_> {
    /// Lookup key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.argument
    }
}

/// Left-to-right iterator over directive tokens.
///
/// Each match resumes scanning right after the previous token, so text is
/// never examined twice.
pub struct DirectiveScanner<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> DirectiveScanner<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: 0 }
    }
}

impl<'a> Iterator for DirectiveScanner<'a> {
    type Item = DirectiveToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = DIRECTIVE_RE.captures_at(self.text, self.cursor)?;
        let whole = caps.get(0)?;
        self.cursor = whole.end();

        let kind = DirectiveKind::from_suffix(caps.get(1).map(|m| m.as_str()));
        let argument = caps.get(2).map_or("", |m| m.as_str());
        Some(DirectiveToken {
            kind,
            span: whole.range(),
            raw: whole.as_str(),
            argument: normalize_argument(argument),
        })
    }
}

/// Undo typographic quoting applied by markdown converters.
///
/// Converters turn `"key"` into ``` ``key'' ```. The TeX quote pairs collapse
/// back to `"`, then one matching pair of straight quotes is stripped. A
/// lone trailing `"` left over from a half-converted pair is dropped too.
#[must_use]
pub fn normalize_argument(raw: &str) -> String {
    let mut arg = raw.trim().to_owned();
    if let Some(rest) = arg.strip_prefix("``") {
        arg = format!("\"{rest}");
    }
    if let Some(rest) = arg.strip_suffix("''") {
        arg = format!("{rest}\"");
    }

    for quote in ['"', '\''] {
        if arg.len() >= 2 && arg.starts_with(quote) && arg.ends_with(quote) {
            return arg[1..arg.len() - 1].to_owned();
        }
    }
    match arg.strip_suffix('"') {
        Some(rest) => rest.to_owned(),
        None => arg,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn scan(text: &str) -> Vec<(DirectiveKind, String)> {
        DirectiveScanner::new(text)
            .map(|t| (t.kind, t.argument))
            .collect()
    }

    #[test]
    fn test_all_kinds() {
        let text = r"\INSERT{a} \INSERTLINK{b} \INSERTFILE{c} \INSERTBADGE{d} \INSERTWITHBADGE{e}";
        assert_eq!(
            scan(text),
            vec![
                (DirectiveKind::Plain, "a".to_owned()),
                (DirectiveKind::Link, "b".to_owned()),
                (DirectiveKind::File, "c".to_owned()),
                (DirectiveKind::Badge, "d".to_owned()),
                (DirectiveKind::WithBadge, "e".to_owned()),
            ]
        );
    }

    #[test]
    fn test_span_and_raw() {
        let text = r"Mean is \INSERT{stats.mean}.";
        let token = DirectiveScanner::new(text).next().unwrap();
        assert_eq!(token.raw, r"\INSERT{stats.mean}");
        assert_eq!(&text[token.span.clone()], token.raw);
        assert_eq!(token.key(), "stats.mean");
    }

    #[test]
    fn test_token_at_end_of_text_ends_scan() {
        let mut scanner = DirectiveScanner::new(r"\INSERT{a}");
        assert_eq!(scanner.next().map(|t| t.span), Some(0..10));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_unknown_marker_word_ignored() {
        assert!(scan(r"\INSERTTABLE{x} \insert{y}").is_empty());
    }

    #[test]
    fn test_nested_braces_not_matched_as_outer() {
        assert_eq!(
            scan(r"\INSERT{a{b}}"),
            Vec::<(DirectiveKind, String)>::new()
        );
    }

    #[test]
    fn test_indexed_argument() {
        assert_eq!(
            scan(r"\INSERT{runs[2]}"),
            vec![(DirectiveKind::Plain, "runs[2]".to_owned())]
        );
    }

    #[test]
    fn test_normalize_double_quotes() {
        assert_eq!(normalize_argument("\"paper\""), "paper");
    }

    #[test]
    fn test_normalize_single_quotes() {
        assert_eq!(normalize_argument("'paper'"), "paper");
    }

    #[test]
    fn test_normalize_tex_quotes() {
        assert_eq!(normalize_argument("``figures/plot.png''"), "figures/plot.png");
    }

    #[test]
    fn test_normalize_trailing_tex_quote_only() {
        assert_eq!(normalize_argument("paper''"), "paper");
    }

    #[test]
    fn test_normalize_plain_unchanged() {
        assert_eq!(normalize_argument("  results.model "), "results.model");
    }

    #[test]
    fn test_normalize_mismatched_quotes_keep_leading() {
        assert_eq!(normalize_argument("'paper\""), "'paper");
    }
}
