//! Clipboard access seam.

use std::sync::Mutex;

/// Trait for reading and writing the local clipboard as text.
pub trait ClipboardAccess: Send + Sync {
    fn get_text(&self) -> Option<String>;
    fn set_text(&self, text: &str);
}

/// In-memory clipboard for tests and headless runs.
#[derive(Default)]
pub struct InMemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl InMemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardAccess for InMemoryClipboard {
    fn get_text(&self) -> Option<String> {
        self.contents.lock().expect("lock poisoned").clone()
    }

    fn set_text(&self, text: &str) {
        *self.contents.lock().expect("lock poisoned") = Some(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_clipboard_round_trips_text() {
        let clipboard = InMemoryClipboard::new();
        assert_eq!(clipboard.get_text(), None);

        clipboard.set_text("copied");

        assert_eq!(clipboard.get_text(), Some("copied".to_string()));
    }
}
