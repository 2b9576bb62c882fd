//! Rendering errors.

use std::io;
use std::path::PathBuf;

use repro_store::LookupError;

use crate::converter::ConvertError;

/// Fatal rendering failure.
///
/// Unknown directive arguments are not errors: the token is left in place and
/// a warning is logged. Everything here aborts the build.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The data store holds a malformed entry or an invalid index.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// A link-class directive referenced an entry without a source URL.
    #[error("Entry '{key}' has no `{field}` field, required by this directive")]
    MissingField { key: String, field: &'static str },
    /// The markdown converter failed.
    #[error(transparent)]
    Convert(#[from] ConvertError),
    /// Converter output lacked the document body delimiters.
    #[error("Converter output has no \\begin{{document}}...\\end{{document}} body")]
    MissingDocumentBody,
    /// A file-copy directive could not stage its source file.
    #[error("Failed to copy {} to {}: {error}", from.display(), to.display())]
    Stage {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: io::Error,
    },
    /// The template has no body placeholder.
    #[error("Template does not contain the placeholder '{0}'")]
    MissingPlaceholder(String),
}
