//! Rendering through an external Mermaid CLI.

use std::{io, process::Stdio};

use log::{debug, trace};
use thiserror::Error;
use tokio::process::Command;

use tessera_core::vector::VectorOutput;

use super::{LayoutScope, Renderer, RendererError, RendererOptions};

const INPUT_FILE: &str = "input.mmd";
const OUTPUT_FILE: &str = "output.svg";
const CONFIG_FILE: &str = "config.json";

/// Shells out to a Mermaid CLI (`mmdc` by default).
///
/// Each call gets a private temporary directory holding the input text, the
/// JSON configuration and the rendered SVG. The directory is removed when
/// the call returns.
#[derive(Debug)]
pub struct CommandRenderer {
    program: String,
    options: Option<RendererOptions>,
}

#[derive(Debug, Error)]
enum CommandFailure {
    #[error("failed to run `{program}`: {source}")]
    Launch { program: String, source: io::Error },

    #[error("{0}")]
    Exit(String),
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            options: None,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, source: &str, options: &RendererOptions) -> Result<String, CommandFailure> {
        let launch = |source: io::Error| CommandFailure::Launch {
            program: self.program.clone(),
            source,
        };

        let dir = tempfile::tempdir().map_err(launch)?;
        let input = dir.path().join(INPUT_FILE);
        let output = dir.path().join(OUTPUT_FILE);
        let config = dir.path().join(CONFIG_FILE);

        tokio::fs::write(&input, source).await.map_err(launch)?;
        tokio::fs::write(&config, options.to_mermaid_config().to_string())
            .await
            .map_err(launch)?;

        trace!(program = self.program.as_str(), dir:? = dir.path(); "Running Mermaid CLI");
        let result = Command::new(&self.program)
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .arg("-c")
            .arg(&config)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(launch)?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("`{}` exited with {}", self.program, result.status)
            } else {
                stderr
            };
            return Err(CommandFailure::Exit(message));
        }

        tokio::fs::read_to_string(&output).await.map_err(launch)
    }

    fn options(&self) -> Result<&RendererOptions, RendererError> {
        self.options.as_ref().ok_or(RendererError::NotInitialized)
    }
}

impl Renderer for CommandRenderer {
    fn configure(&mut self, options: &RendererOptions) -> Result<(), RendererError> {
        debug!(program = self.program.as_str(), theme:% = options.theme; "Configuring command renderer");
        self.options = Some(options.clone());
        Ok(())
    }

    async fn validate(&self, source: &str) -> Result<(), RendererError> {
        let options = self.options()?;
        match self.run(source, options).await {
            Ok(_) => Ok(()),
            Err(failure @ CommandFailure::Exit(_)) => {
                Err(RendererError::SyntaxInvalid(failure.to_string()))
            }
            Err(failure @ CommandFailure::Launch { .. }) => {
                Err(RendererError::RenderFailed(failure.to_string()))
            }
        }
    }

    async fn layout(&self, scope: LayoutScope<'_>) -> Result<VectorOutput, RendererError> {
        let options = self.options()?.clone().with_theme(scope.theme);
        let markup = self
            .run(scope.source, &options)
            .await
            .map_err(|failure| RendererError::RenderFailed(failure.to_string()))?;
        debug!(id:% = scope.id, bytes = markup.len(); "Mermaid CLI produced SVG");
        Ok(VectorOutput::new(markup))
    }
}
