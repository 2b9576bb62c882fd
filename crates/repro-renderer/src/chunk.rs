//! Document segmentation into typed chunks.
//!
//! A document is prose by default. HTML-comment markers switch regions to
//! another kind:
//!
//! ```text
//! Prose with \INSERT{stats.mean}.
//! <!--%#latex-->\begin{center}\INSERT{table}\end{center}<!--%#/latex-->
//! <!--%#comment-->Reviewer notes, never rendered.<!--%#/comment-->
//! ```
//!
//! Markers are not validated against each other: any end marker reverts to
//! prose and any start marker overrides the active kind, so mis-nested
//! documents segment leniently instead of failing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Kind of a document region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// Markdown prose (the default outside markers).
    Prose,
    /// Raw LaTeX passed through without markdown conversion.
    RawMarkup,
    /// Author comments, dropped from the output.
    Comment,
    /// Executable snippet, passed through unchanged.
    Executable,
    /// Markdown nested inside another region.
    NestedProse,
}

/// Kinds introduced by explicit markers, with their start and end literals.
const MARKED_KINDS: [(ChunkKind, &str, &str); 4] = [
    (ChunkKind::RawMarkup, "<!--%#latex-->", "<!--%#/latex-->"),
    (ChunkKind::Comment, "<!--%#comment-->", "<!--%#/comment-->"),
    (ChunkKind::Executable, "<!--%#exec-->", "<!--%#/exec-->"),
    (ChunkKind::NestedProse, "<!--%#md-->", "<!--%#/md-->"),
];

/// Nested prose start marker, tolerating stray whitespace.
static NESTED_PROSE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*%#\s*md\s*-->").unwrap());

/// Anything resembling a chunk marker.
static LEFTOVER_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*%#\s*/?\s*[A-Za-z_-]*\s*-->").unwrap());

impl ChunkKind {
    /// Start and end marker literals, or `None` for prose.
    #[must_use]
    pub fn markers(self) -> Option<(&'static str, &'static str)> {
        MARKED_KINDS
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, start, end)| (*start, *end))
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Prose => "prose",
            Self::RawMarkup => "latex",
            Self::Comment => "comment",
            Self::Executable => "exec",
            Self::NestedProse => "md",
        }
    }
}

/// A kind-tagged region of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    pub text: String,
}

impl Chunk {
    #[must_use]
    pub fn new(kind: ChunkKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Start,
    End,
}

/// A marker occurrence in the document.
#[derive(Debug, Clone, Copy)]
struct MarkerHit {
    start: usize,
    end: usize,
    kind: ChunkKind,
    role: Role,
}

/// Split a document into ordered chunks.
///
/// Marker text never appears in chunk bodies, whitespace-only chunks are
/// dropped, and source order is preserved. Comment chunks are kept here and
/// discarded at render time.
///
/// # Examples
///
/// ```
/// use repro_renderer::{ChunkKind, segment};
///
/// let chunks = segment("Intro\n<!--%#latex-->\\newpage<!--%#/latex-->\nOutro");
/// let kinds: Vec<_> = chunks.iter().map(|c| c.kind).collect();
/// assert_eq!(kinds, [ChunkKind::Prose, ChunkKind::RawMarkup, ChunkKind::Prose]);
/// assert_eq!(chunks[1].text, "\\newpage");
/// ```
#[must_use]
pub fn segment(document: &str) -> Vec<Chunk> {
    let markers = locate_markers(document);
    let mut chunks = Vec::with_capacity(markers.len() + 1);
    let mut kind = ChunkKind::Prose;
    let mut cursor = 0;

    for marker in &markers {
        if marker.start < cursor {
            continue;
        }
        chunks.push(Chunk::new(kind, &document[cursor..marker.start]));
        kind = match marker.role {
            Role::Start => marker.kind,
            Role::End => ChunkKind::Prose,
        };
        cursor = marker.end;
    }
    chunks.push(Chunk::new(kind, &document[cursor..]));

    let chunks = tidy(chunks);
    tracing::debug!(
        markers = markers.len(),
        chunks = chunks.len(),
        "Segmented document"
    );
    chunks
}

/// Find every start and end marker, ordered by position.
fn locate_markers(document: &str) -> Vec<MarkerHit> {
    let mut hits = Vec::new();
    for (kind, start, end) in MARKED_KINDS {
        for (literal, role) in [(start, Role::Start), (end, Role::End)] {
            hits.extend(document.match_indices(literal).map(|(pos, _)| MarkerHit {
                start: pos,
                end: pos + literal.len(),
                kind,
                role,
            }));
        }
    }
    hits.sort_by_key(|hit| hit.start);
    hits
}

/// Post-segmentation cleanup.
fn tidy(chunks: Vec<Chunk>) -> Vec<Chunk> {
    chunks
        .into_iter()
        .filter_map(|mut chunk| {
            if chunk.kind == ChunkKind::Comment {
                truncate_at_nested_prose(&mut chunk.text);
            }
            if let Cow::Owned(stripped) = LEFTOVER_MARKER_RE.replace_all(&chunk.text, "") {
                chunk.text = stripped;
            }
            (!chunk.text.trim().is_empty()).then_some(chunk)
        })
        .collect()
}

/// Overlapping tags can leave a nested prose opener inside a comment.
fn truncate_at_nested_prose(text: &mut String) {
    if let Some(found) = NESTED_PROSE_START_RE.find(text) {
        text.truncate(found.start());
    }
}
