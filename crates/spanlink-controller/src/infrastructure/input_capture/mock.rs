//! Mock input source for unit testing.
//!
//! Lets tests inject synthetic [`RawInputEvent`]s without OS hooks, and
//! records how often the session asked for the current event to be
//! suppressed.

use std::sync::Mutex;

use tokio::sync::mpsc;

use super::{CaptureError, InputSource, RawInputEvent};

/// A scripted implementation of [`InputSource`].
pub struct MockInputSource {
    sender: Mutex<Option<mpsc::UnboundedSender<RawInputEvent>>>,
    suppress_count: Mutex<u32>,
}

impl MockInputSource {
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(None),
            suppress_count: Mutex::new(0),
        }
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called.
    pub fn inject_event(&self, event: RawInputEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        match *guard {
            Some(ref sender) => sender
                .send(event)
                .expect("receiver dropped; session not running"),
            None => panic!("MockInputSource::inject_event called before start()"),
        }
    }

    /// Number of times [`InputSource::suppress_current_event`] was called.
    pub fn suppress_count(&self) -> u32 {
        *self.suppress_count.lock().expect("lock poisoned")
    }
}

impl Default for MockInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::UnboundedReceiver<RawInputEvent>, CaptureError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        *self.sender.lock().expect("lock poisoned") = None;
    }

    fn suppress_current_event(&self) {
        *self.suppress_count.lock().expect("lock poisoned") += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_delivers_injected_events() {
        // Arrange
        let source = MockInputSource::new();
        let mut rx = source.start().expect("start");

        // Act
        source.inject_event(RawInputEvent::MouseMove { x: 10, y: 20 });

        // Assert
        assert_eq!(
            rx.try_recv().expect("event queued"),
            RawInputEvent::MouseMove { x: 10, y: 20 }
        );
    }

    #[test]
    fn test_stop_closes_the_channel() {
        let source = MockInputSource::new();
        let mut rx = source.start().expect("start");

        source.stop();

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_suppress_count_increments() {
        let source = MockInputSource::new();
        source.suppress_current_event();
        source.suppress_current_event();
        assert_eq!(source.suppress_count(), 2);
    }
}
