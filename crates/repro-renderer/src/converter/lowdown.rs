//! External `lowdown` converter.

use std::io::Write;
use std::process::{Command, Stdio};

use super::{ConvertError, MarkdownConverter};

/// Arguments for standalone LaTeX output without intra-word emphasis or
/// superscript parsing.
const LOWDOWN_ARGS: [&str; 4] = ["-s", "-tlatex", "--parse-no-intraemph", "--parse-no-super"];

/// Runs `lowdown`, feeding markdown on stdin.
///
/// The call blocks until the program exits; there is no timeout.
#[derive(Debug, Clone)]
pub struct LowdownConverter {
    program: String,
    args: Vec<String>,
}

impl Default for LowdownConverter {
    fn default() -> Self {
        Self::new("lowdown")
    }
}

impl LowdownConverter {
    /// Use `program` with the standard lowdown arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: LOWDOWN_ARGS.iter().map(|&arg| arg.to_owned()).collect(),
        }
    }

    /// Replace the argument list.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Command line for diagnostics.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl MarkdownConverter for LowdownConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        tracing::info!(command = %self.command_line(), "Running converter");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ConvertError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // The child may block on a full stdout pipe before draining stdin.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = markdown.to_owned();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output()?;
        let written = match writer.map(std::thread::JoinHandle::join) {
            Some(Ok(result)) => result,
            Some(Err(_)) => Err(std::io::Error::other("converter input writer panicked")),
            None => Ok(()),
        };

        if !output.status.success() {
            return Err(ConvertError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        written?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
