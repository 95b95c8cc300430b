// Two-line status display
//
// The robot runs fine without one; every write is best-effort.

use tracing::info;
use zenoh::Wait;
use zenoh::pubsub::Publisher;

use crate::config::TOPIC_DISPLAY;
use crate::messages::DisplayText;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Display publish failed: {0}")]
    Publish(String),

    #[error("Display encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Text output primitives of a small character display
pub trait TextDisplay {
    /// Replace both lines
    fn show(&mut self, line_one: &str, line_two: &str) -> Result<(), DisplayError>;

    /// Blank the screen
    fn clear(&mut self) -> Result<(), DisplayError>;
}

impl<D: TextDisplay + ?Sized> TextDisplay for Box<D> {
    fn show(&mut self, line_one: &str, line_two: &str) -> Result<(), DisplayError> {
        (**self).show(line_one, line_two)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }
}

/// Nothing attached
#[derive(Debug, Default)]
pub struct NullDisplay;

impl TextDisplay for NullDisplay {
    fn show(&mut self, _line_one: &str, _line_two: &str) -> Result<(), DisplayError> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Writes display text to the log instead of a screen
#[derive(Debug, Default)]
pub struct LogDisplay;

impl TextDisplay for LogDisplay {
    fn show(&mut self, line_one: &str, line_two: &str) -> Result<(), DisplayError> {
        info!("[display] {} | {}", line_one, line_two);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        info!("[display] cleared");
        Ok(())
    }
}

/// Mirrors display text to a zenoh topic for a remote screen
///
/// Writes block on the publication, so this needs the multi-thread runtime.
pub struct ZenohDisplay {
    publisher: Publisher<'static>,
}

impl ZenohDisplay {
    pub async fn new(session: &zenoh::Session) -> Result<Self, DisplayError> {
        let publisher = session
            .declare_publisher(TOPIC_DISPLAY)
            .await
            .map_err(|e| DisplayError::Publish(e.to_string()))?;
        info!("Mirroring display text to {}", TOPIC_DISPLAY);
        Ok(Self { publisher })
    }

    fn put(&self, text: &DisplayText) -> Result<(), DisplayError> {
        let json = serde_json::to_string(text)?;
        self.publisher
            .put(json)
            .wait()
            .map_err(|e| DisplayError::Publish(e.to_string()))
    }
}

impl TextDisplay for ZenohDisplay {
    fn show(&mut self, line_one: &str, line_two: &str) -> Result<(), DisplayError> {
        self.put(&DisplayText {
            line_one: line_one.to_string(),
            line_two: line_two.to_string(),
        })
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.put(&DisplayText {
            line_one: String::new(),
            line_two: String::new(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Display that keeps every frame; `None` marks a clear
    #[derive(Clone, Default)]
    pub struct RecordingDisplay {
        pub frames: Rc<RefCell<Vec<Option<(String, String)>>>>,
        pub fail: bool,
    }

    impl RecordingDisplay {
        pub fn last(&self) -> Option<Option<(String, String)>> {
            self.frames.borrow().last().cloned()
        }

        pub fn last_line_one(&self) -> Option<String> {
            self.last().flatten().map(|(one, _)| one)
        }

        pub fn frames(&self) -> Vec<Option<(String, String)>> {
            self.frames.borrow().clone()
        }
    }

    impl TextDisplay for RecordingDisplay {
        fn show(&mut self, line_one: &str, line_two: &str) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Publish("no screen".to_string()));
            }
            self.frames
                .borrow_mut()
                .push(Some((line_one.to_string(), line_two.to_string())));
            Ok(())
        }

        fn clear(&mut self) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Publish("no screen".to_string()));
            }
            self.frames.borrow_mut().push(None);
            Ok(())
        }
    }

    #[test]
    fn test_null_and_log_displays_accept_writes() {
        assert!(NullDisplay.show("a", "b").is_ok());
        assert!(NullDisplay.clear().is_ok());
        assert!(LogDisplay.show("MODE: Manual", "").is_ok());
        assert!(LogDisplay.clear().is_ok());
    }

    #[test]
    fn test_recording_display_order() {
        let mut display = RecordingDisplay::default();
        display.show("one", "two").unwrap();
        display.clear().unwrap();
        assert_eq!(
            display.frames(),
            vec![Some(("one".to_string(), "two".to_string())), None]
        );
    }
}
