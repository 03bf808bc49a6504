//! Configuration types for Tessera.
//!
//! This module provides the configuration structures that select a renderer
//! backend, tune the editor, and control exports. All types implement
//! [`serde::Deserialize`] so they can be loaded from external sources, and
//! every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`RendererConfig`] - Backend selection and Mermaid options.
//! - [`EditorConfig`] - Debounce delay, default theme, notification lifetime.
//! - [`ExportConfig`] - Default format and PNG settings.
//!
//! # Example
//!
//! ```
//! # use tessera::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.editor().debounce().as_millis(), 500);
//! assert!(config.export().background().is_ok());
//! ```

use std::time::Duration;

use serde::Deserialize;

use tessera_core::{color::Color, export::ExportFormat, theme::ThemePreference};

use crate::{
    export::DEFAULT_MAX_DIMENSION,
    renderer::{FlowchartOptions, GanttOptions, RendererOptions, SecurityLevel, SequenceOptions},
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Renderer configuration section.
    #[serde(default)]
    renderer: RendererConfig,

    /// Editor configuration section.
    #[serde(default)]
    editor: EditorConfig,

    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    pub fn new(renderer: RendererConfig, editor: EditorConfig, export: ExportConfig) -> Self {
        Self {
            renderer,
            editor,
            export,
        }
    }

    pub fn renderer(&self) -> &RendererConfig {
        &self.renderer
    }

    pub fn editor(&self) -> &EditorConfig {
        &self.editor
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// Which renderer implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process rendering.
    #[default]
    Native,
    /// An external Mermaid CLI.
    Command,
}

/// Renderer backend selection and Mermaid diagram-family options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    backend: Backend,
    /// Program run by the [`Backend::Command`] backend.
    command: String,
    flowchart: FlowchartOptions,
    sequence: SequenceOptions,
    gantt: GanttOptions,
    security_level: SecurityLevel,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            command: "mmdc".to_string(),
            flowchart: FlowchartOptions::default(),
            sequence: SequenceOptions::default(),
            gantt: GanttOptions::default(),
            security_level: SecurityLevel::default(),
        }
    }
}

impl RendererConfig {
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Builds the renderer options for `theme`.
    pub fn renderer_options(&self, theme: ThemePreference) -> RendererOptions {
        RendererOptions {
            theme,
            flowchart: self.flowchart.clone(),
            sequence: self.sequence.clone(),
            gantt: self.gantt.clone(),
            security_level: self.security_level,
        }
    }
}

/// Editor behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    debounce_ms: u64,
    /// Theme used when none has been persisted yet.
    theme: ThemePreference,
    notification_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            theme: ThemePreference::Light,
            notification_ms: 3000,
        }
    }
}

impl EditorConfig {
    /// Delay between the last edit and re-classification.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme
    }

    /// How long a notification stays up.
    pub fn notification_lifetime(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

/// Export settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    format: ExportFormat,
    /// PNG background as a CSS color. Follows the theme when unset.
    background: Option<String>,
    max_dimension: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            background: None,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl ExportConfig {
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background(&self) -> Result<Option<Color>, String> {
        self.background
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid export background in config: {err}"))
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }
}
