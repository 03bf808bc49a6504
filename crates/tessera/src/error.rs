//! Error types for Tessera operations.
//!
//! This module provides the main error type [`TesseraError`] which wraps the
//! error of every stage: rendering, export, persistence and clipboard access.

use std::io;

use thiserror::Error;

use crate::{
    clipboard::ClipboardError, export::ExportError, orchestrator::RenderError,
    renderer::RendererError, storage::StorageError,
};

/// The main error type for Tessera operations.
#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Renderer(#[from] RendererError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The input text cannot be processed, e.g. it is blank.
    #[error("{0}")]
    Input(String),

    /// A failure the editor reported through its status and notifications.
    #[error("{0}")]
    Editor(String),
}
