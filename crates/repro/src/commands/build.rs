//! `repro build` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use repro_config::{CliSettings, Config, ConverterKind};
use repro_renderer::{
    BuildSummary, BuiltinConverter, LowdownConverter, MarkdownConverter, ReportBuilder,
    ReportSources,
};

use crate::error::CliError;
use crate::output::Output;

/// Markdown converter choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ConverterArg {
    /// External lowdown program.
    Lowdown,
    /// Built-in pulldown-cmark converter.
    Builtin,
}

impl From<ConverterArg> for ConverterKind {
    fn from(arg: ConverterArg) -> Self {
        match arg {
            ConverterArg::Lowdown => Self::Lowdown,
            ConverterArg::Builtin => Self::Builtin,
        }
    }
}

/// Arguments for the build command.
#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    /// Work directory holding config.toml and build intermediates (default: <project-dir>/reproduce).
    #[arg(short, long, env = "REPROWORKDIR")]
    workdir: Option<PathBuf>,

    /// Directory the configured file paths are relative to (default: current directory).
    #[arg(short, long)]
    project_dir: Option<PathBuf>,

    /// Path to configuration file (default: <workdir>/config.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compiled report path (default: <workdir>/output/report.tex).
    #[arg(short, long, env = "REPROWORKOUTFILE")]
    output: Option<PathBuf>,

    /// Markdown converter (overrides config).
    #[arg(long, value_enum)]
    converter: Option<ConverterArg>,

    /// lowdown executable (overrides config).
    #[arg(long)]
    lowdown: Option<String>,

    /// Enable verbose output (log every substitution).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any build step fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let output_path = config.output_path();

        if let Some(path) = &config.config_path {
            output.field("Config", &path.display().to_string());
        }
        output.field("Input", &config.files.input.display().to_string());
        output.field("Output", &output_path.display().to_string());

        let project_dir = self.project_dir.unwrap_or_else(|| PathBuf::from("."));
        let summary = build_report(&config, project_dir)?;

        output.success(&format!(
            "Report written to {} ({} chunks)",
            summary.output.display(),
            summary.chunks
        ));
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            workdir: self.workdir.clone(),
            project_dir: self.project_dir.clone(),
            converter: self.converter.map(ConverterKind::from),
            lowdown: self.lowdown.clone(),
            output: self.output.clone(),
        }
    }
}

/// Build the report described by `config`.
fn build_report(config: &Config, project_dir: PathBuf) -> Result<BuildSummary, CliError> {
    let render = &config.repro.render;
    let converter: Box<dyn MarkdownConverter> = match render.converter {
        ConverterKind::Lowdown => Box::new(LowdownConverter::new(&render.lowdown)),
        ConverterKind::Builtin => Box::new(BuiltinConverter::new()),
    };
    tracing::info!(converter = converter.name(), "Selected markdown converter");

    let sources = ReportSources {
        document: config.files.input.clone(),
        store: config.files.dynamic.clone(),
        template: config.files.latex_template.clone(),
    };
    let summary = ReportBuilder::new(converter, sources, &config.workdir)
        .with_config(config.values.clone())
        .with_placeholder(&render.placeholder)
        .with_staging_dir(&render.staging_dir)
        .with_source_dir(project_dir)
        .with_badge_label(&config.repro.badge.label)
        .build(&config.output_path())?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: BuildArgs,
    }

    #[test]
    fn test_cli_settings_from_args() {
        let cli = TestCli::try_parse_from([
            "repro",
            "--workdir",
            "work",
            "--project-dir",
            "proj",
            "--output",
            "out/report.tex",
            "--converter",
            "builtin",
            "--lowdown",
            "/opt/bin/lowdown",
        ])
        .unwrap();
        let settings = cli.args.cli_settings();

        assert_eq!(settings.workdir, Some(PathBuf::from("work")));
        assert_eq!(settings.project_dir, Some(PathBuf::from("proj")));
        assert_eq!(settings.output, Some(PathBuf::from("out/report.tex")));
        assert_eq!(settings.converter, Some(ConverterKind::Builtin));
        assert_eq!(settings.lowdown.as_deref(), Some("/opt/bin/lowdown"));
    }

    #[test]
    fn test_dotenv_file_supplies_workdir_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(
            &env_file,
            "REPROWORKDIR=from-env/work\nREPROWORKOUTFILE=from-env/report.tex\n",
        )
        .unwrap();
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("REPROWORKDIR");
            std::env::remove_var("REPROWORKOUTFILE");
        }

        dotenvy::from_path(&env_file).unwrap();
        let parsed = TestCli::try_parse_from(["repro"]);
        unsafe {
            std::env::remove_var("REPROWORKDIR");
            std::env::remove_var("REPROWORKOUTFILE");
        }

        let settings = parsed.unwrap().args.cli_settings();
        assert_eq!(settings.workdir, Some(PathBuf::from("from-env/work")));
        assert_eq!(settings.output, Some(PathBuf::from("from-env/report.tex")));
    }

    #[test]
    fn test_unknown_converter_rejected() {
        assert!(TestCli::try_parse_from(["repro", "--converter", "pandoc"]).is_err());
    }

    #[test]
    fn test_build_report_with_builtin_converter() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path();
        std::fs::write(project.join("report.md"), "Result: \\INSERT{answer}\n").unwrap();
        std::fs::write(project.join("dynamic.toml"), "answer = 42\n").unwrap();
        std::fs::write(
            project.join("template.tex"),
            "% \\INSERT{config.project.name}\n%%@@LOWDOWN_CONTENT@@%%\n",
        )
        .unwrap();

        let config = Config::from_toml_str(
            r#"
[project]
name = "Demo"

[repro.files]
input = "report.md"
dynamic = "dynamic.toml"
latex_template = "template.tex"

[repro.render]
converter = "builtin"
"#,
            project,
        )
        .unwrap();

        let summary = build_report(&config, project.to_path_buf()).unwrap();

        assert_eq!(summary.chunks, 1);
        assert_eq!(summary.output, project.join("reproduce/output/report.tex"));
        assert_eq!(
            std::fs::read_to_string(&summary.output).unwrap(),
            "% Demo\n\nResult: 42\n"
        );
    }
}
