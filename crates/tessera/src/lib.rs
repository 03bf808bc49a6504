//! Tessera - a workbench that turns Mermaid text into diagrams.
//!
//! Classification, rendering, export and the editor state machine for
//! Mermaid diagram sources. Rendering goes through a pluggable
//! [`Renderer`](renderer::Renderer) so the same pipeline drives the
//! in-process renderer, an external Mermaid CLI, or a test double.
//!
//! # Pipeline
//!
//! ```text
//! Text
//!     ↓ classify (tessera-classify)
//! Kind + element count
//!     ↓ render (orchestrator + renderer)
//! Mounted diagram on the stage
//!     ↓ export
//! SVG / PNG artifact
//! ```
//!
//! The [`controller`] module wraps the pipeline in the editor's
//! action/effect loop.
//!
//! # Example
//!
//! ```rust,no_run
//! use tessera::{
//!     orchestrator::RenderOrchestrator,
//!     renderer::{NativeRenderer, RendererOptions},
//!     stage::{ContainerId, Stage},
//!     RequestedKind,
//! };
//!
//! # async fn run() -> Result<(), tessera::TesseraError> {
//! let mut orchestrator = RenderOrchestrator::new(NativeRenderer::new());
//! orchestrator.configure(RendererOptions::default())?;
//!
//! let stage = Stage::with_container("diagram-container");
//! let result = orchestrator
//!     .render(
//!         "graph TD\nA[Start]-->B[End]",
//!         &stage,
//!         &ContainerId::from("diagram-container"),
//!         RequestedKind::Auto,
//!     )
//!     .await?;
//! assert!(result.success());
//! # Ok(())
//! # }
//! ```

pub mod clipboard;
pub mod config;
pub mod controller;
pub mod export;
pub mod orchestrator;
pub mod renderer;
pub mod samples;
pub mod stage;
pub mod storage;

mod error;

#[cfg(test)]
mod test_utils;

pub use tessera_classify::{Classification, classify, count, detect, format_text, resolve};
pub use tessera_core::{
    color,
    export::ExportFormat,
    kind::{DiagramKind, RequestedKind},
    theme::ThemePreference,
    vector::VectorOutput,
};

pub use error::TesseraError;
