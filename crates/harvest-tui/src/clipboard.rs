use arboard::Clipboard;
use harvest_core::ClipboardSink;

/// System clipboard. Copying silently fails when no clipboard is available
/// (headless sessions, SSH without forwarding).
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let clipboard = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                tracing::warn!(error = %err, "system clipboard unavailable");
                None
            }
        };
        Self { clipboard }
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> bool {
        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(text) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to copy to clipboard");
                    false
                }
            },
            None => false,
        }
    }
}
