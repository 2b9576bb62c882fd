//! Markdown to LaTeX converters.
//!
//! Converters produce a standalone LaTeX document. The pipeline keeps only
//! the document body ([`extract_document_body`]) and undoes the converter's
//! escaping of directive syntax ([`normalize_escapes`]).

mod builtin;
mod lowdown;
mod normalize;

use std::io;

pub use builtin::BuiltinConverter;
pub use lowdown::LowdownConverter;
pub use normalize::{ESCAPE_NORMALIZATIONS, normalize_escapes};

use crate::RenderError;

const BEGIN_DOCUMENT: &str = "\\begin{document}";
const END_DOCUMENT: &str = "\\end{document}";

/// Markdown to standalone LaTeX conversion.
pub trait MarkdownConverter {
    /// Converter name for diagnostics.
    fn name(&self) -> &str;

    /// Convert markdown into a complete LaTeX document.
    fn convert(&self, markdown: &str) -> Result<String, ConvertError>;
}

impl<T: MarkdownConverter + ?Sized> MarkdownConverter for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        (**self).convert(markdown)
    }
}

impl<T: MarkdownConverter + ?Sized> MarkdownConverter for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        (**self).convert(markdown)
    }
}

/// Converter invocation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The converter program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// Reading or writing the converter's pipes failed.
    #[error("Converter I/O error: {0}")]
    Io(#[from] io::Error),
    /// The converter exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Lines strictly between the `\begin{document}` line and the last
/// `\end{document}` line.
pub fn extract_document_body(document: &str) -> Result<String, RenderError> {
    let lines: Vec<&str> = document.lines().collect();
    let begin = lines
        .iter()
        .position(|line| line.contains(BEGIN_DOCUMENT))
        .ok_or(RenderError::MissingDocumentBody)?;
    let end = lines
        .iter()
        .rposition(|line| line.contains(END_DOCUMENT))
        .filter(|&end| end > begin)
        .ok_or(RenderError::MissingDocumentBody)?;
    Ok(lines[begin + 1..end].join("\n"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_extract_body() {
        let doc = "\\documentclass{article}\n\\begin{document}\n\nHello.\n\n\\end{document}\n";
        assert_eq!(extract_document_body(doc).unwrap(), "\nHello.\n");
    }

    #[test]
    fn test_extract_body_missing_begin() {
        let err = extract_document_body("Hello.\n\\end{document}").unwrap_err();
        assert!(matches!(err, RenderError::MissingDocumentBody));
    }

    #[test]
    fn test_extract_body_missing_end() {
        let err = extract_document_body("\\begin{document}\nHello.").unwrap_err();
        assert!(matches!(err, RenderError::MissingDocumentBody));
    }

    #[test]
    fn test_extract_body_end_before_begin() {
        let err = extract_document_body("\\end{document}\n\\begin{document}").unwrap_err();
        assert!(matches!(err, RenderError::MissingDocumentBody));
    }

    #[test]
    fn test_extract_empty_body() {
        assert_eq!(
            extract_document_body("\\begin{document}\n\\end{document}").unwrap(),
            ""
        );
    }
}
