//! Directive substitution against the data store.

use std::path::Path;

use repro_store::{DataStore, Resolved};

use super::markup;
use super::parser::{DirectiveKind, DirectiveScanner, DirectiveToken};
use super::staging::AssetStaging;
use crate::RenderError;

/// Default text of the source badge.
pub const DEFAULT_BADGE_LABEL: &str = "source";

/// Replaces directive tokens with values from a [`DataStore`].
///
/// Unknown keys leave the token untouched and log a warning. Malformed
/// entries, link-class directives without a source URL and failed file
/// copies abort with a [`RenderError`].
///
/// # Example
///
/// ```
/// use repro_renderer::DirectiveRewriter;
/// use repro_store::DataStore;
///
/// let store = DataStore::from_toml_str(
///     "[paper]\nvalue = \"Smith 2020\"\npublished_url = \"https://doi.org/x\"",
/// )
/// .unwrap();
/// let rewriter = DirectiveRewriter::new(&store);
/// let out = rewriter.rewrite(r"See \INSERTLINK{paper}.").unwrap();
/// assert_eq!(out, r"See \href{https://doi.org/x}{Smith 2020}.");
/// ```
#[derive(Debug)]
pub struct DirectiveRewriter<'a> {
    store: &'a DataStore,
    staging: AssetStaging,
    badge_label: String,
}

impl<'a> DirectiveRewriter<'a> {
    #[must_use]
    pub fn new(store: &'a DataStore) -> Self {
        Self {
            store,
            staging: AssetStaging::default(),
            badge_label: DEFAULT_BADGE_LABEL.to_owned(),
        }
    }

    /// Set where file-copy directives stage their files.
    #[must_use]
    pub fn with_staging(mut self, staging: AssetStaging) -> Self {
        self.staging = staging;
        self
    }

    /// Set the text shown inside source badges.
    #[must_use]
    pub fn with_badge_label(mut self, label: impl Into<String>) -> Self {
        self.badge_label = label.into();
        self
    }

    /// Substitute every directive in `text`.
    ///
    /// Output is assembled in a fresh buffer while the source is scanned left
    /// to right, so inserted text is never scanned again even if it happens to
    /// contain directive syntax.
    pub fn rewrite(&self, text: &str) -> Result<String, RenderError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for token in DirectiveScanner::new(text) {
            out.push_str(&text[last..token.span.start]);
            last = token.span.end;

            match self.store.resolve(token.key())? {
                Some(resolved) => {
                    tracing::info!(kind = token.kind.marker(), "Replacing {}", token.key());
                    out.push_str(&self.substitute(&token, &resolved)?);
                }
                None => {
                    tracing::warn!(key = token.key(), "No data store entry for {}", token.raw);
                    out.push_str(token.raw);
                }
            }
        }

        out.push_str(&text[last..]);
        Ok(out)
    }

    fn substitute(
        &self,
        token: &DirectiveToken<'_>,
        resolved: &Resolved,
    ) -> Result<String, RenderError> {
        let value = resolved.text();

        if resolved.metadata.is_plot() {
            let badge = if resolved.metadata.wants_badge() {
                Some(self.badge(token.key(), resolved)?)
            } else {
                None
            };
            return Ok(markup::figure(
                &value,
                resolved.metadata.description(),
                badge.as_deref(),
            ));
        }

        match token.kind {
            DirectiveKind::Plain => Ok(value),
            DirectiveKind::Link => {
                let url = source_url(token.key(), resolved)?;
                Ok(markup::hyperlink(url, &value))
            }
            DirectiveKind::File => self.staging.stage(Path::new(&value)),
            DirectiveKind::Badge => self.badge(token.key(), resolved),
            DirectiveKind::WithBadge => {
                let badge = self.badge(token.key(), resolved)?;
                Ok(markup::with_badge(&value, &badge))
            }
        }
    }

    fn badge(&self, key: &str, resolved: &Resolved) -> Result<String, RenderError> {
        let url = source_url(key, resolved)?;
        Ok(markup::badge(url, &self.badge_label))
    }
}

fn source_url<'r>(key: &str, resolved: &'r Resolved) -> Result<&'r str, RenderError> {
    resolved
        .metadata
        .published_url()
        .ok_or_else(|| RenderError::MissingField {
            key: key.to_owned(),
            field: "published_url",
        })
}
