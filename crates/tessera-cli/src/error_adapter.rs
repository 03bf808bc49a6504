//! Error adapter for converting TesseraError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use tessera::{
    TesseraError, export::ExportError, orchestrator::RenderError, renderer::RendererError,
};

/// Adapter for [`TesseraError`].
///
/// Tessera errors carry no source spans, so the adapter contributes a code
/// and, where there is an obvious fix, a help line.
pub struct ErrorAdapter<'a>(pub &'a TesseraError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            TesseraError::Io(_) => "tessera::io",
            TesseraError::Render(_) => "tessera::render",
            TesseraError::Renderer(_) => "tessera::renderer",
            TesseraError::Export(_) => "tessera::export",
            TesseraError::Storage(_) => "tessera::storage",
            TesseraError::Clipboard(_) => "tessera::clipboard",
            TesseraError::Config(_) => "tessera::config",
            TesseraError::Input(_) => "tessera::input",
            TesseraError::Editor(_) => "tessera::editor",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            TesseraError::Input(_) => "pass a FILE, or load text with `tessera sample`",
            TesseraError::Clipboard(_) => "clipboard access needs a graphical session",
            TesseraError::Render(RenderError::NotInitialized)
            | TesseraError::Renderer(RendererError::NotInitialized) => {
                "check the [renderer] section of the configuration"
            }
            TesseraError::Export(ExportError::UnsupportedFormat(_)) => {
                "supported formats are `svg` and `png`"
            }
            TesseraError::Export(ExportError::NoDiagram) => "render a diagram before exporting",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Wraps `err` for rendering with a miette report handler.
pub fn to_reportable(err: &TesseraError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}
