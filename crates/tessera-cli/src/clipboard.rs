//! System clipboard access through `arboard`.

use log::debug;

use tessera::clipboard::{Clipboard, ClipboardError};

/// The desktop clipboard. A connection is opened per write, so a missing
/// display only fails the copy itself.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|err| ClipboardError(err.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| ClipboardError(err.to_string()))?;
        debug!(chars = text.chars().count(); "Text copied to clipboard");
        Ok(())
    }
}
