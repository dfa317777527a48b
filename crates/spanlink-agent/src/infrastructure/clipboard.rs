//! Clipboard access seam.

use std::sync::Mutex;

/// Read/write access to the local clipboard.
pub trait ClipboardAccess: Send + Sync {
    fn get_text(&self) -> Option<String>;
    fn set_text(&self, text: &str);
}

/// In-memory clipboard used by tests and headless runs.
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
        self.contents.lock().expect("clipboard lock poisoned").clone()
    }

    fn set_text(&self, text: &str) {
        *self.contents.lock().expect("clipboard lock poisoned") = Some(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_round_trips() {
        let clipboard = InMemoryClipboard::new();
        assert_eq!(clipboard.get_text(), None);

        clipboard.set_text("copied");

        assert_eq!(clipboard.get_text(), Some("copied".to_string()));
    }
}
