//! Clipboard access for copying optimized prompts

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    Write(String),
}

/// Destination for the copy action
pub trait Clipboard: Send {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

type Opener = fn() -> Result<arboard::Clipboard, arboard::Error>;

/// The operating system clipboard.
///
/// The handle is opened on first write and retried on later writes, so a
/// missing display surfaces as a failed copy rather than at startup.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    open: Opener,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::with_opener(arboard::Clipboard::new)
    }

    fn with_opener(open: Opener) -> Self {
        Self { inner: None, open }
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        if self.inner.is_none() {
            let clipboard =
                (self.open)().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("no clipboard handle".to_string()))
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.handle()?
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// Process-local clipboard; nothing leaves the process
#[derive(Debug, Default)]
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
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn unreachable_system_clipboard() -> SystemClipboard {
        SystemClipboard::with_opener(|| Err(arboard::Error::ClipboardNotSupported))
    }

    #[test]
    fn test_unreachable_system_clipboard_fails_every_write() {
        let mut clipboard = unreachable_system_clipboard();

        for _ in 0..2 {
            let err = clipboard.write_text("text").unwrap_err();
            assert!(matches!(err, ClipboardError::Unavailable(_)));
        }
        assert!(clipboard.inner.is_none());
    }

    #[test]
    fn test_memory_clipboard_keeps_last_write() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.contents(), None);

        clipboard.write_text("one").unwrap();
        clipboard.write_text("two").unwrap();
        assert_eq!(clipboard.contents(), Some("two"));
    }
}
