//! Project settings for repro report builds.
//!
//! Parses the work directory's `config.toml` with serde. The typed view
//! drives the build (source files, converter, staging); the raw table is kept
//! alongside it so documents can reference any setting through
//! `\INSERT{config.some.key}`.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Path expansion
//!
//! The `[repro.files]` paths support `${VAR}` environment references and a
//! leading `~`, and are resolved against the project directory.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use toml::Table;

/// Configuration filename inside the work directory.
const CONFIG_FILENAME: &str = "config.toml";

/// Default work directory, relative to the project directory.
pub const DEFAULT_WORKDIR: &str = "reproduce";

/// Template token replaced by the rendered document body.
pub const DEFAULT_PLACEHOLDER: &str = "%%@@LOWDOWN_CONTENT@@%%";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Work directory holding `config.toml` and build intermediates.
    pub workdir: Option<PathBuf>,
    /// Directory the `[repro.files]` paths are relative to.
    pub project_dir: Option<PathBuf>,
    /// Override the markdown converter.
    pub converter: Option<ConverterKind>,
    /// Override the lowdown executable.
    pub lowdown: Option<String>,
    /// Override the compiled output file.
    pub output: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// `[repro]` section.
    pub repro: ReproConfig,

    /// The whole settings document, for `config.` references.
    #[serde(skip)]
    pub values: Table,
    /// Resolved source files (set after loading).
    #[serde(skip)]
    pub files: FilesConfig,
    /// Work directory (set after loading).
    #[serde(skip)]
    pub workdir: PathBuf,
    /// Compiled output file override (set from CLI settings).
    #[serde(skip)]
    pub output: Option<PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[repro]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ReproConfig {
    /// Source files as written in TOML.
    files: FilesConfigRaw,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Source badge settings.
    pub badge: BadgeConfig,
}

/// Raw `[repro.files]` section (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FilesConfigRaw {
    input: Option<String>,
    dynamic: Option<String>,
    latex_template: Option<String>,
}

/// Resolved source files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    /// Annotated markdown document.
    pub input: PathBuf,
    /// Data store file.
    pub dynamic: PathBuf,
    /// Template containing the body placeholder.
    pub latex_template: PathBuf,
}

/// Markdown converter selection.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// External `lowdown` executable.
    #[default]
    Lowdown,
    /// In-process pulldown-cmark conversion.
    Builtin,
}

/// `[repro.render]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Markdown converter.
    pub converter: ConverterKind,
    /// Program used by the lowdown converter.
    pub lowdown: String,
    /// Staging directory for copied files, relative to the work directory.
    pub staging_dir: String,
    /// Template placeholder token.
    pub placeholder: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            converter: ConverterKind::default(),
            lowdown: "lowdown".to_owned(),
            staging_dir: "tmp/static".to_owned(),
            placeholder: DEFAULT_PLACEHOLDER.to_owned(),
        }
    }
}

/// `[repro.badge]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    /// Text shown inside source badges.
    pub label: String,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            label: "source".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`repro.files.input`").
        field: String,
        /// Error message (e.g., "${`DATA_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require an optional string field to be present and non-empty.
fn require_field<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ConfigError> {
    let value = value.ok_or_else(|| ConfigError::Validation(format!("{field} is required")))?;
    require_non_empty(value, field)?;
    Ok(value)
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise reads
    /// `config.toml` from the work directory (`<project_dir>/reproduce`
    /// unless overridden).
    ///
    /// CLI settings are applied after loading and path resolution, allowing
    /// CLI arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if the config file doesn't exist, fails to parse, or
    /// fails validation.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let default_settings = CliSettings::default();
        let settings = cli_settings.unwrap_or(&default_settings);

        let project_dir = settings
            .project_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let workdir = settings
            .workdir
            .clone()
            .unwrap_or_else(|| project_dir.join(DEFAULT_WORKDIR));

        let path = config_path.map_or_else(|| workdir.join(CONFIG_FILENAME), Path::to_path_buf);
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }

        let mut config = Self::load_from_file(&path, &project_dir)?;
        config.workdir = workdir;
        config.apply_cli_settings(settings);

        Ok(config)
    }

    /// Parse configuration from TOML source without touching the filesystem.
    ///
    /// Paths resolve against `project_dir`; the work directory defaults to
    /// `project_dir/reproduce`.
    pub fn from_toml_str(source: &str, project_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(source)?;
        config.values = toml::from_str(source)?;
        config.expand_and_resolve(project_dir)?;
        config.workdir = project_dir.join(DEFAULT_WORKDIR);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(converter) = settings.converter {
            self.repro.render.converter = converter;
        }
        if let Some(lowdown) = &settings.lowdown {
            self.repro.render.lowdown.clone_from(lowdown);
        }
        if let Some(output) = &settings.output {
            self.output = Some(output.clone());
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path, project_dir: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content, project_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Expand and resolve `[repro.files]` against the project directory.
    fn expand_and_resolve(&mut self, project_dir: &Path) -> Result<(), ConfigError> {
        let raw = &self.repro.files;
        let resolve = |value: Option<&str>, field: &str| -> Result<PathBuf, ConfigError> {
            let value = require_field(value, field)?;
            Ok(project_dir.join(expand::expand_path(value, field)?))
        };

        self.files = FilesConfig {
            input: resolve(raw.input.as_deref(), "repro.files.input")?,
            dynamic: resolve(raw.dynamic.as_deref(), "repro.files.dynamic")?,
            latex_template: resolve(
                raw.latex_template.as_deref(),
                "repro.files.latex_template",
            )?,
        };
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let render = &self.repro.render;
        require_non_empty(&render.lowdown, "repro.render.lowdown")?;
        require_non_empty(&render.placeholder, "repro.render.placeholder")?;
        require_non_empty(&render.staging_dir, "repro.render.staging_dir")?;
        if Path::new(&render.staging_dir).is_absolute() {
            return Err(ConfigError::Validation(
                "repro.render.staging_dir must be relative to the work directory".to_owned(),
            ));
        }
        Ok(())
    }

    /// Intermediate artifacts directory (`<workdir>/tmp`).
    #[must_use]
    pub fn tmp_dir(&self) -> PathBuf {
        self.workdir.join("tmp")
    }

    /// Compiled output file: CLI override, else `<workdir>/output/report.tex`.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.workdir.join("output").join("report.tex"))
    }
}
