//! Cursor control implementations.
//!
//! A production build implements [`CursorController`] with the OS cursor
//! APIs. The [`NullCursor`] here backs headless runs and keeps the session
//! wiring identical either way.

use std::sync::Mutex;

use tracing::debug;

use crate::application::share_input::CursorController;

/// Tracks the cursor position in memory without touching any OS API.
pub struct NullCursor {
    pos: Mutex<(i32, i32)>,
}

impl NullCursor {
    pub fn new() -> Self {
        Self {
            pos: Mutex::new((0, 0)),
        }
    }
}

impl Default for NullCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorController for NullCursor {
    fn move_cursor(&self, x: i32, y: i32) {
        debug!(x, y, "cursor warp");
        *self.pos.lock().expect("lock poisoned") = (x, y);
    }

    fn cursor_pos(&self) -> (i32, i32) {
        *self.pos.lock().expect("lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_cursor_remembers_last_warp() {
        let cursor = NullCursor::new();
        assert_eq!(cursor.cursor_pos(), (0, 0));

        cursor.move_cursor(640, 480);

        assert_eq!(cursor.cursor_pos(), (640, 480));
    }
}
