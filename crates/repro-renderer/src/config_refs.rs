//! `\INSERT{config.*}` substitution against project configuration.

use repro_store::{Table, lookup_dotted, value_text};

use crate::directive::{DirectiveKind, DirectiveScanner};

/// Argument prefix routing a plain insertion to the configuration.
pub const CONFIG_PREFIX: &str = "config.";

/// Replace `\INSERT{config.a.b}` with the text of `a.b` in `config`.
///
/// Only plain insertions are considered. Other directives and unknown
/// configuration keys are left untouched; the latter log a warning.
///
/// # Examples
///
/// ```
/// use repro_renderer::resolve_config_refs;
///
/// let config: repro_store::Table = "[project]\nname = \"Study\"".parse().unwrap();
/// assert_eq!(
///     resolve_config_refs(r"\title{\INSERT{config.project.name}}", &config),
///     r"\title{Study}"
/// );
/// ```
#[must_use]
pub fn resolve_config_refs(text: &str, config: &Table) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for token in DirectiveScanner::new(text) {
        if token.kind != DirectiveKind::Plain {
            continue;
        }
        let Some(path) = token.key().strip_prefix(CONFIG_PREFIX) else {
            continue;
        };

        out.push_str(&text[last..token.span.start]);
        last = token.span.end;
        match lookup_dotted(config, path) {
            Some(value) => {
                tracing::info!("Replacing {}", token.key());
                out.push_str(&value_text(value));
            }
            None => {
                tracing::warn!(key = path, "No configuration value for {}", token.raw);
                out.push_str(token.raw);
            }
        }
    }

    out.push_str(&text[last..]);
    out
}
