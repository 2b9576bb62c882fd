//! Inline insertion directives.
//!
//! Documents reference data store values with brace-delimited tokens:
//!
//! | Token                  | Output                                      |
//! |------------------------|---------------------------------------------|
//! | `\INSERT{key}`         | value text                                  |
//! | `\INSERTLINK{key}`     | `\href{url}{value}`                         |
//! | `\INSERTFILE{key}`     | path of the staged copy of the file         |
//! | `\INSERTBADGE{key}`    | source badge linking to `published_url`     |
//! | `\INSERTWITHBADGE{key}`| value followed by a badge row               |
//!
//! Entries flagged `plot` render as a figure regardless of the token kind.

mod markup;
mod parser;
mod rewriter;
mod staging;

pub use parser::{DirectiveKind, DirectiveScanner, DirectiveToken, normalize_argument};
pub use rewriter::{DEFAULT_BADGE_LABEL, DirectiveRewriter};
pub use staging::{AssetStaging, DEFAULT_STAGING_DIR};
