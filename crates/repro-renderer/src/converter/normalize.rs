//! Undo converter escaping of directive syntax.

use std::sync::LazyLock;

use crate::Replacements;

/// Escapes emitted by markdown converters and their plain replacements.
///
/// Applied in order; `\emph{` must precede the brace unescapes.
pub const ESCAPE_NORMALIZATIONS: [(&str, &str); 10] = [
    ("\\emph{", "*"),
    ("textbackslash{}", ""),
    ("\\{", "{"),
    ("\\}", "}"),
    ("\\#", "#"),
    ("\\$", "$"),
    ("\\%", "%"),
    ("\\&", "&"),
    ("\\_", "_"),
    ("\\textasciicircum{}", "^"),
];

static TABLE: LazyLock<Replacements> =
    LazyLock::new(|| Replacements::from_pairs(&ESCAPE_NORMALIZATIONS));

/// Restore plain markup in converter output.
#[must_use]
pub fn normalize_escapes(text: &str) -> String {
    let mut out = text.to_owned();
    let fired = TABLE.apply(&mut out);
    if fired > 0 {
        tracing::debug!(fired, "Normalized converter escapes");
    }
    out
}
