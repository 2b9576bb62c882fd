//! Filepath alias derivation.
//!
//! File entries are indexed under a key derived from their path so documents
//! can reference them by path even though paths are not valid dotted keys.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Number of hex digits of the path hash kept in the alias.
const HASH_DIGITS: usize = 12;

/// Compute the store alias for a file path.
///
/// The alias is the sanitized file name followed by a prefix of the SHA-256
/// of the full path string, so two files sharing a basename never collide.
/// It depends only on the path string.
///
/// # Examples
///
/// ```
/// use repro_store::filepath_alias;
///
/// let alias = filepath_alias("figures/plot.png");
/// assert!(alias.starts_with("plot_png_"));
/// assert_eq!(alias, filepath_alias("figures/plot.png"));
/// assert_ne!(alias, filepath_alias("other/plot.png"));
/// ```
#[must_use]
pub fn filepath_alias(path: &str) -> String {
    let file_name = Path::new(path)
        .file_name()
        .map_or_else(|| path.to_owned(), |name| name.to_string_lossy().into_owned());
    let sanitized: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{sanitized}_{}", &digest[..HASH_DIGITS])
}
