//! Write-only clipboard access.

use std::future::Future;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to write to clipboard: {0}")]
pub struct ClipboardError(pub String);

/// A place to put the editor text.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> impl Future<Output = Result<(), ClipboardError>>;
}

/// Clipboard that keeps the last written text in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}
