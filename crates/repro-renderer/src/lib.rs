//! Rendering of annotated markdown reports into LaTeX.
//!
//! A report document is markdown prose interleaved with marked regions and
//! inline directives that pull values out of a [`repro_store::DataStore`]:
//!
//! ```text
//! # Results
//!
//! The model reached \INSERTLINK{results.accuracy} on held-out data.
//!
//! <!--%#latex-->
//! \INSERTWITHBADGE{tables.summary}
//! <!--%#/latex-->
//! ```
//!
//! # Architecture
//!
//! - [`segment`] splits the document into typed [`Chunk`]s.
//! - [`RenderPipeline`] routes each chunk: prose through a
//!   [`MarkdownConverter`], raw LaTeX straight to the [`DirectiveRewriter`],
//!   comments nowhere.
//! - [`ReportBuilder`] runs the whole build, from the template's
//!   `config.` references to the compiled output file.
//!
//! Two converters are provided: [`LowdownConverter`] runs the external
//! `lowdown` program and [`BuiltinConverter`] converts in process with
//! `pulldown-cmark`.

mod chunk;
mod config_refs;
mod converter;
pub mod directive;
mod error;
mod pipeline;
mod replacements;
mod report;
mod template;

pub use chunk::{Chunk, ChunkKind, segment};
pub use config_refs::{CONFIG_PREFIX, resolve_config_refs};
pub use converter::{
    BuiltinConverter, ConvertError, ESCAPE_NORMALIZATIONS, LowdownConverter, MarkdownConverter,
    extract_document_body, normalize_escapes,
};
pub use directive::{AssetStaging, DirectiveRewriter};
pub use error::RenderError;
pub use pipeline::RenderPipeline;
pub use replacements::Replacements;
pub use report::{BuildError, BuildSummary, DEFAULT_PLACEHOLDER, ReportBuilder, ReportSources};
pub use template::splice_body;
