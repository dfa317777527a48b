//! Recording injector for unit tests and headless runs.

use std::sync::Mutex;

use spanlink_core::protocol::messages::MouseButton;

use super::{InjectionError, InputInjector};

/// One recorded injection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedEvent {
    CursorMove { x: i32, y: i32 },
    Button { button: MouseButton, down: bool },
    Wheel { dx: i32, dy: i32 },
    Key { key: i32, down: bool },
}

/// An [`InputInjector`] that records every call instead of touching the OS.
#[derive(Default)]
pub struct RecordingInjector {
    events: Mutex<Vec<InjectedEvent>>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded calls in order.
    pub fn events(&self) -> Vec<InjectedEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }

    fn record(&self, event: InjectedEvent) {
        self.events.lock().expect("lock poisoned").push(event);
    }
}

impl InputInjector for RecordingInjector {
    fn move_cursor(&self, x: i32, y: i32) -> Result<(), InjectionError> {
        self.record(InjectedEvent::CursorMove { x, y });
        Ok(())
    }

    fn mouse_button(&self, button: MouseButton, down: bool) -> Result<(), InjectionError> {
        self.record(InjectedEvent::Button { button, down });
        Ok(())
    }

    fn mouse_wheel(&self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        self.record(InjectedEvent::Wheel { dx, dy });
        Ok(())
    }

    fn key(&self, key: i32, down: bool) -> Result<(), InjectionError> {
        self.record(InjectedEvent::Key { key, down });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_injector_keeps_call_order() {
        let injector = RecordingInjector::new();

        injector.move_cursor(10, 20).unwrap();
        injector.key(0x41, true).unwrap();
        injector.key(0x41, false).unwrap();

        assert_eq!(
            injector.events(),
            vec![
                InjectedEvent::CursorMove { x: 10, y: 20 },
                InjectedEvent::Key { key: 0x41, down: true },
                InjectedEvent::Key { key: 0x41, down: false },
            ]
        );
    }
}
