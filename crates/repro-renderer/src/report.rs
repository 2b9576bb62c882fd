//! End-to-end report build.
//!
//! Intermediate artifacts are written under `<workdir>/tmp` and left on disk
//! when a later step fails:
//!
//! ```text
//! <workdir>/tmp/latex_template_interim.tex   template after config refs
//! <workdir>/tmp/body.tex                     rendered document body
//! <workdir>/<staging_dir>/...                files copied by \INSERTFILE
//! ```

use std::io;
use std::path::{Path, PathBuf};

use repro_store::{DataStore, StoreError, Table};

use crate::chunk::segment;
use crate::config_refs::resolve_config_refs;
use crate::converter::MarkdownConverter;
use crate::directive::{AssetStaging, DEFAULT_BADGE_LABEL, DEFAULT_STAGING_DIR};
use crate::pipeline::RenderPipeline;
use crate::template::splice_body;
use crate::RenderError;

/// Default template placeholder.
pub const DEFAULT_PLACEHOLDER: &str = "%%@@LOWDOWN_CONTENT@@%%";

const TMP_DIR: &str = "tmp";
const INTERIM_TEMPLATE: &str = "latex_template_interim.tex";
const BODY_FILE: &str = "body.tex";

/// Error building a report.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Input files of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSources {
    /// Annotated markdown document.
    pub document: PathBuf,
    /// TOML data store.
    pub store: PathBuf,
    /// LaTeX template containing the body placeholder.
    pub template: PathBuf,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Number of chunks the document was segmented into.
    pub chunks: usize,
    /// Path of the compiled document.
    pub output: PathBuf,
}

/// Builds a LaTeX report from a document, a data store and a template.
pub struct ReportBuilder<C> {
    converter: C,
    sources: ReportSources,
    workdir: PathBuf,
    config: Table,
    placeholder: String,
    staging_dir: String,
    source_dir: Option<PathBuf>,
    badge_label: String,
}

impl<C: MarkdownConverter> ReportBuilder<C> {
    #[must_use]
    pub fn new(converter: C, sources: ReportSources, workdir: impl Into<PathBuf>) -> Self {
        Self {
            converter,
            sources,
            workdir: workdir.into(),
            config: Table::new(),
            placeholder: DEFAULT_PLACEHOLDER.to_owned(),
            staging_dir: DEFAULT_STAGING_DIR.to_owned(),
            source_dir: None,
            badge_label: DEFAULT_BADGE_LABEL.to_owned(),
        }
    }

    /// Configuration for `config.` directives.
    #[must_use]
    pub fn with_config(mut self, config: Table) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Staging directory for copied files, relative to the work directory.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<String>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Directory relative file-copy sources are resolved against.
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_badge_label(mut self, label: impl Into<String>) -> Self {
        self.badge_label = label.into();
        self
    }

    /// Run the build and write the compiled document to `output`.
    pub fn build(&self, output: &Path) -> Result<BuildSummary, BuildError> {
        let tmp = self.workdir.join(TMP_DIR);
        create_dir(&tmp)?;

        tracing::info!(
            template = %self.sources.template.display(),
            "Resolving config references in template"
        );
        let template = resolve_config_refs(&read(&self.sources.template)?, &self.config);
        write(&tmp.join(INTERIM_TEMPLATE), &template)?;

        let document = read(&self.sources.document)?;
        let store = DataStore::load(&self.sources.store)?;

        let chunks = segment(&document);
        tracing::info!(
            chunks = chunks.len(),
            document = %self.sources.document.display(),
            "Rendering document"
        );
        let body = self.pipeline(&store).render_chunks(&chunks)?;
        write(&tmp.join(BODY_FILE), &body)?;

        let compiled = splice_body(&template, &self.placeholder, &body)?;
        if let Some(parent) = output.parent() {
            create_dir(parent)?;
        }
        write(output, &compiled)?;
        tracing::info!(output = %output.display(), "Wrote report");

        Ok(BuildSummary {
            chunks: chunks.len(),
            output: output.to_path_buf(),
        })
    }

    fn pipeline<'s>(&'s self, store: &'s DataStore) -> RenderPipeline<'s, &'s C> {
        let mut staging = AssetStaging::new(&self.workdir, &self.staging_dir);
        if let Some(dir) = &self.source_dir {
            staging = staging.with_source_dir(dir);
        }
        RenderPipeline::new(&self.converter, store)
            .with_config(self.config.clone())
            .with_staging(staging)
            .with_badge_label(&self.badge_label)
    }
}

fn read(path: &Path) -> Result<String, BuildError> {
    std::fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), BuildError> {
    std::fs::write(path, contents).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}
