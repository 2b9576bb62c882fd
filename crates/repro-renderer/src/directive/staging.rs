//! Asset staging for file-copy directives.

use std::path::{Path, PathBuf};

use crate::RenderError;

/// Default staging directory, relative to the work directory.
pub const DEFAULT_STAGING_DIR: &str = "tmp/static";

/// Copies referenced files into the build's staging directory.
///
/// Copies overwrite existing files and directory creation is repeatable, so
/// staging the same file twice is harmless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetStaging {
    root: PathBuf,
    dir: String,
    source_dir: Option<PathBuf>,
}

impl Default for AssetStaging {
    fn default() -> Self {
        Self::new(".", DEFAULT_STAGING_DIR)
    }
}

impl AssetStaging {
    /// Stage under `root/dir`, referencing copies as `dir/<name>`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            dir: dir.into(),
            source_dir: None,
        }
    }

    /// Resolve relative source paths against `dir` instead of the process
    /// working directory.
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Absolute (or root-relative) staging directory.
    #[must_use]
    pub fn target_dir(&self) -> PathBuf {
        self.root.join(&self.dir)
    }

    /// Copy `source` into the staging directory.
    ///
    /// Returns the reference to use in the document.
    pub fn stage(&self, source: &Path) -> Result<String, RenderError> {
        let source = match &self.source_dir {
            Some(dir) if source.is_relative() => dir.join(source),
            _ => source.to_path_buf(),
        };
        let source = source.as_path();
        let target_dir = self.target_dir();
        let name = source.file_name().map_or_else(
            || source.to_string_lossy().into_owned(),
            |name| name.to_string_lossy().into_owned(),
        );
        let target = target_dir.join(&name);

        let stage_error = |error: std::io::Error| RenderError::Stage {
            from: source.to_path_buf(),
            to: target.clone(),
            error,
        };
        std::fs::create_dir_all(&target_dir).map_err(&stage_error)?;
        std::fs::copy(source, &target).map_err(&stage_error)?;

        tracing::debug!(from = %source.display(), to = %target.display(), "Staged file");
        Ok(format!("{}/{name}", self.dir.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_stage_copies_and_returns_relative_reference() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("results.csv");
        std::fs::write(&source, "a,b\n1,2\n").unwrap();

        let staging = AssetStaging::new(dir.path().join("work"), "tmp/static");
        let reference = staging.stage(&source).unwrap();

        assert_eq!(reference, "tmp/static/results.csv");
        let copied = std::fs::read_to_string(dir.path().join("work/tmp/static/results.csv")).unwrap();
        assert_eq!(copied, "a,b\n1,2\n");
    }

    #[test]
    fn test_stage_twice_overwrites() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("plot.png");
        std::fs::write(&source, "v1").unwrap();

        let staging = AssetStaging::new(dir.path(), "static");
        staging.stage(&source).unwrap();
        std::fs::write(&source, "v2").unwrap();
        staging.stage(&source).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("static/plot.png")).unwrap(), "v2");
    }

    #[test]
    fn test_stage_missing_source_is_error() {
        let dir = TempDir::new().unwrap();
        let staging = AssetStaging::new(dir.path(), "static");
        let err = staging.stage(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, RenderError::Stage { .. }));
    }

    #[test]
    fn test_relative_source_resolved_against_source_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/table.tex"), "x").unwrap();

        let staging = AssetStaging::new(dir.path().join("work"), "tmp/static")
            .with_source_dir(dir.path());
        let reference = staging.stage(Path::new("data/table.tex")).unwrap();

        assert_eq!(reference, "tmp/static/table.tex");
        assert!(dir.path().join("work/tmp/static/table.tex").exists());
    }

    #[test]
    fn test_default_staging_dir() {
        assert_eq!(AssetStaging::default().target_dir(), PathBuf::from("./tmp/static"));
    }
}
