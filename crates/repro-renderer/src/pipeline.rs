//! Chunk rendering.

use repro_store::{DataStore, Table};

use crate::chunk::{Chunk, ChunkKind, segment};
use crate::config_refs::resolve_config_refs;
use crate::converter::{MarkdownConverter, extract_document_body, normalize_escapes};
use crate::directive::{AssetStaging, DirectiveRewriter};
use crate::RenderError;

/// Separator between rendered chunks.
const CHUNK_SEPARATOR: &str = "\n\n";

/// Routes chunks to their rendering path and joins the results.
///
/// | Kind          | Rendering                                                   |
/// |---------------|-------------------------------------------------------------|
/// | prose, nested | config refs, convert, extract body, normalize, directives, config refs |
/// | raw markup    | config refs, directives                                     |
/// | comment       | dropped                                                     |
/// | executable    | unchanged                                                   |
///
/// # Example
///
/// ```
/// use repro_renderer::{BuiltinConverter, RenderPipeline};
/// use repro_store::DataStore;
///
/// let store = DataStore::from_toml_str("[x]\nvalue = \"42\"").unwrap();
/// let pipeline = RenderPipeline::new(BuiltinConverter::new(), &store);
/// let body = pipeline
///     .render_document("<!--%#latex-->\\INSERT{x}<!--%#/latex-->")
///     .unwrap();
/// assert_eq!(body, "42");
/// ```
pub struct RenderPipeline<'a, C> {
    converter: C,
    rewriter: DirectiveRewriter<'a>,
    config: Table,
}

impl<'a, C: MarkdownConverter> RenderPipeline<'a, C> {
    #[must_use]
    pub fn new(converter: C, store: &'a DataStore) -> Self {
        Self {
            converter,
            rewriter: DirectiveRewriter::new(store),
            config: Table::new(),
        }
    }

    /// Set the configuration `config.` directives resolve against.
    #[must_use]
    pub fn with_config(mut self, config: Table) -> Self {
        self.config = config;
        self
    }

    /// Set where file-copy directives stage their files.
    #[must_use]
    pub fn with_staging(mut self, staging: AssetStaging) -> Self {
        self.rewriter = self.rewriter.with_staging(staging);
        self
    }

    /// Set the text shown inside source badges.
    #[must_use]
    pub fn with_badge_label(mut self, label: impl Into<String>) -> Self {
        self.rewriter = self.rewriter.with_badge_label(label);
        self
    }

    /// Segment and render a whole document.
    pub fn render_document(&self, document: &str) -> Result<String, RenderError> {
        self.render_chunks(&segment(document))
    }

    /// Render chunks in order, joined by a blank line.
    pub fn render_chunks(&self, chunks: &[Chunk]) -> Result<String, RenderError> {
        let mut rendered = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            tracing::debug!(index, kind = chunk.kind.name(), "Rendering chunk");
            if let Some(text) = self.render_chunk(chunk)? {
                rendered.push(text);
            }
        }
        Ok(rendered.join(CHUNK_SEPARATOR))
    }

    /// Render one chunk. Comments render to `None`.
    pub fn render_chunk(&self, chunk: &Chunk) -> Result<Option<String>, RenderError> {
        let text = match chunk.kind {
            ChunkKind::Prose | ChunkKind::NestedProse => self.render_prose(&chunk.text)?,
            ChunkKind::RawMarkup => self
                .rewriter
                .rewrite(&resolve_config_refs(&chunk.text, &self.config))?,
            ChunkKind::Comment => return Ok(None),
            ChunkKind::Executable => chunk.text.clone(),
        };
        Ok(Some(text))
    }

    fn render_prose(&self, markdown: &str) -> Result<String, RenderError> {
        let markdown = resolve_config_refs(markdown, &self.config);
        let document = self.converter.convert(&markdown)?;
        let body = normalize_escapes(&extract_document_body(&document)?);
        let body = self.rewriter.rewrite(&body)?;
        // Raw LaTeX passed through the converter can expose more config refs.
        Ok(resolve_config_refs(&body, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::converter::{BuiltinConverter, ConvertError};

    /// Wraps markdown in a document, escaping the way lowdown does.
    struct EchoConverter;

    impl MarkdownConverter for EchoConverter {
        fn name(&self) -> &str {
            "echo"
        }

        fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
            let escaped = markdown
                .replace('\\', "\\textbackslash{}")
                .replace('_', "\\_")
                .replace("textbackslash{}", "textbackslash\u{0}")
                .replace('{', "\\{")
                .replace('}', "\\}")
                .replace("textbackslash\u{0}", "textbackslash{}");
            Ok(format!(
                "\\documentclass{{article}}\n\\begin{{document}}\n{}\n\\end{{document}}\n",
                escaped.trim()
            ))
        }
    }

    /// Emits output without document delimiters.
    struct BrokenConverter;

    impl MarkdownConverter for BrokenConverter {
        fn name(&self) -> &str {
            "broken"
        }

        fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
            Ok(markdown.to_owned())
        }
    }

    const STORE: &str = r#"
[x]
value = "42"

[paper]
value = "paper"
published_url = "https://x"

[nourl]
value = "orphan"

[stats]
mean_value = 4.5
"#;

    fn store() -> DataStore {
        DataStore::from_toml_str(STORE).unwrap()
    }

    fn config() -> Table {
        "[project]\nname = \"Study\"".parse().unwrap()
    }

    #[test]
    fn test_raw_markup_insert() {
        let store = store();
        let pipeline = RenderPipeline::new(EchoConverter, &store);
        let body = pipeline
            .render_document("<!--%#latex-->\\INSERT{x}<!--%#/latex-->")
            .unwrap();
        assert_eq!(body, "42");
        assert!(!body.contains("<!--"));
    }

    #[test]
    fn test_prose_goes_through_converter() {
        let store = store();
        let pipeline = RenderPipeline::new(EchoConverter, &store);
        let body = pipeline
            .render_document("Mean is \\INSERT{stats.mean_value} for \\INSERTLINK{paper}.")
            .unwrap();
        assert_eq!(body, "Mean is 4.5 for \\href{https://x}{paper}.");
    }

    #[test]
    fn test_comment_never_rendered() {
        let store = store();
        let pipeline = RenderPipeline::new(EchoConverter, &store);
        let body = pipeline
            .render_document("Before\n<!--%#comment-->secret \\INSERTLINK{nourl}<!--%#/comment-->\nAfter")
            .unwrap();
        assert_eq!(body, "Before\n\nAfter");
    }

    #[test]
    fn test_executable_passes_through() {
        let store = store();
        let pipeline = RenderPipeline::new(EchoConverter, &store);
        let body = pipeline
            .render_document("<!--%#exec-->print(\\INSERT{x})<!--%#/exec-->")
            .unwrap();
        assert_eq!(body, "print(\\INSERT{x})");
    }

    #[test]
    fn test_nested_prose_rendered_as_prose() {
        let store = store();
        let pipeline = RenderPipeline::new(EchoConverter, &store);
        let body = pipeline
            .render_document("<!--%#md-->Value \\INSERT{x}<!--%#/md-->")
            .unwrap();
        assert_eq!(body, "Value 42");
    }

    #[test]
    fn test_chunks_joined_in_order() {
        let store = store();
        let pipeline = RenderPipeline::new(EchoConverter, &store);
        let body = pipeline
            .render_document("one\n<!--%#latex-->two<!--%#/latex-->\nthree")
            .unwrap();
        assert_eq!(body, "one\n\ntwo\n\nthree");
    }

    #[test]
    fn test_config_refs_in_raw_markup_and_prose() {
        let store = store();
        let pipeline = RenderPipeline::new(EchoConverter, &store).with_config(config());
        let body = pipeline
            .render_document("Project \\INSERT{config.project.name}\n<!--%#latex-->\\textbf{\\INSERT{config.project.name}}<!--%#/latex-->")
            .unwrap();
        assert_eq!(body, "Project Study\n\n\\textbf{Study}");
    }

    #[test]
    fn test_missing_url_aborts() {
        let store = store();
        let pipeline = RenderPipeline::new(EchoConverter, &store);
        let err = pipeline
            .render_document("<!--%#latex-->\\INSERTLINK{nourl}<!--%#/latex-->")
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingField { .. }));
    }

    #[test]
    fn test_missing_document_body_aborts() {
        let store = store();
        let pipeline = RenderPipeline::new(BrokenConverter, &store);
        let err = pipeline.render_document("Some prose").unwrap_err();
        assert!(matches!(err, RenderError::MissingDocumentBody));
    }

    #[test]
    fn test_unknown_key_survives_round_trip() {
        let store = store();
        let pipeline = RenderPipeline::new(EchoConverter, &store);
        let body = pipeline.render_document("Keep \\INSERT{no.such_key}").unwrap();
        assert_eq!(body, "Keep \\INSERT{no.such_key}");
    }

    #[test]
    fn test_builtin_converter_end_to_end() {
        let store = store();
        let pipeline = RenderPipeline::new(BuiltinConverter::new(), &store).with_badge_label("src");
        let body = pipeline
            .render_document("# Results\n\nAnswer **\\INSERT{x}** \\INSERTBADGE{paper}")
            .unwrap();
        assert_eq!(
            body,
            "\n\\section{Results}\n\nAnswer \\textbf{42} \\href{https://x}{\\fbox{\\scriptsize src}}"
        );
    }
}
