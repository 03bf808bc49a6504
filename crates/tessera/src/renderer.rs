//! The seam between Tessera and a Mermaid renderer.
//!
//! A [`Renderer`] is configured once, then asked to validate source text and
//! to lay out a single mounted diagram. Two backends ship with the crate:
//!
//! - [`NativeRenderer`] renders in-process through `mermaid-rs-renderer`.
//! - [`CommandRenderer`] shells out to a Mermaid CLI such as `mmdc`.
//!
//! [`AnyRenderer`] picks one of them from [`RendererConfig`].

mod command;
mod native;

pub use command::CommandRenderer;
pub use native::NativeRenderer;

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use tessera_core::{theme::ThemePreference, vector::VectorOutput};

use crate::{
    config::{Backend, RendererConfig},
    stage::DiagramId,
};

/// Failures reported by a renderer backend.
///
/// Validation and layout failures are distinct and both recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RendererError {
    #[error("{0}")]
    SyntaxInvalid(String),

    #[error("{0}")]
    RenderFailed(String),

    #[error("Renderer is not initialized")]
    NotInitialized,
}

/// How much the renderer trusts the diagram text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Strict,
    #[default]
    Loose,
    Antiscript,
    Sandbox,
}

/// Flowchart family options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct FlowchartOptions {
    pub use_max_width: bool,
    pub html_labels: bool,
    pub curve: String,
}

impl Default for FlowchartOptions {
    fn default() -> Self {
        Self {
            use_max_width: true,
            html_labels: true,
            curve: "basis".to_string(),
        }
    }
}

/// Sequence diagram family options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct SequenceOptions {
    pub use_max_width: bool,
    pub note_font_weight: String,
    pub actor_font_size: u32,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            use_max_width: true,
            note_font_weight: "normal".to_string(),
            actor_font_size: 14,
        }
    }
}

/// Gantt chart family options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct GanttOptions {
    pub use_max_width: bool,
    pub bar_height: u32,
    pub bar_gap: u32,
}

impl Default for GanttOptions {
    fn default() -> Self {
        Self {
            use_max_width: true,
            bar_height: 20,
            bar_gap: 4,
        }
    }
}

/// One-time renderer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererOptions {
    pub theme: ThemePreference,
    pub flowchart: FlowchartOptions,
    pub sequence: SequenceOptions,
    pub gantt: GanttOptions,
    pub security_level: SecurityLevel,
}

impl RendererOptions {
    /// Returns a copy of these options using `theme`.
    pub fn with_theme(mut self, theme: ThemePreference) -> Self {
        self.theme = theme;
        self
    }

    /// Builds the Mermaid configuration object for these options.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera::renderer::RendererOptions;
    ///
    /// let config = RendererOptions::default().to_mermaid_config();
    /// assert_eq!(config["theme"], "default");
    /// assert_eq!(config["flowchart"]["curve"], "basis");
    /// assert_eq!(config["securityLevel"], "loose");
    /// ```
    pub fn to_mermaid_config(&self) -> serde_json::Value {
        json!({
            "startOnLoad": false,
            "theme": self.theme.renderer_theme(),
            "flowchart": self.flowchart,
            "sequence": self.sequence,
            "gantt": self.gantt,
            "securityLevel": self.security_level,
        })
    }
}

/// The element a layout pass is scoped to.
///
/// Only this element is laid out; other diagrams on the stage are untouched.
#[derive(Debug, Clone, Copy)]
pub struct LayoutScope<'a> {
    pub id: &'a DiagramId,
    pub source: &'a str,
    pub theme: ThemePreference,
}

/// A Mermaid renderer backend.
pub trait Renderer {
    /// Applies one-time configuration. Must succeed before the first
    /// `validate` or `layout` call, and may be called again to re-theme.
    fn configure(&mut self, options: &RendererOptions) -> Result<(), RendererError>;

    /// Checks `source` against the renderer's grammar.
    fn validate(&self, source: &str) -> impl Future<Output = Result<(), RendererError>>;

    /// Produces vector output for one mounted diagram.
    fn layout(
        &self,
        scope: LayoutScope<'_>,
    ) -> impl Future<Output = Result<VectorOutput, RendererError>>;
}

/// A renderer selected at runtime from configuration.
#[derive(Debug)]
pub enum AnyRenderer {
    Native(NativeRenderer),
    Command(CommandRenderer),
}

impl AnyRenderer {
    pub fn from_config(config: &RendererConfig) -> Self {
        match config.backend() {
            Backend::Native => Self::Native(NativeRenderer::new()),
            Backend::Command => Self::Command(CommandRenderer::new(config.command())),
        }
    }
}

impl Renderer for AnyRenderer {
    fn configure(&mut self, options: &RendererOptions) -> Result<(), RendererError> {
        match self {
            Self::Native(renderer) => renderer.configure(options),
            Self::Command(renderer) => renderer.configure(options),
        }
    }

    async fn validate(&self, source: &str) -> Result<(), RendererError> {
        match self {
            Self::Native(renderer) => renderer.validate(source).await,
            Self::Command(renderer) => renderer.validate(source).await,
        }
    }

    async fn layout(&self, scope: LayoutScope<'_>) -> Result<VectorOutput, RendererError> {
        match self {
            Self::Native(renderer) => renderer.layout(scope).await,
            Self::Command(renderer) => renderer.layout(scope).await,
        }
    }
}
