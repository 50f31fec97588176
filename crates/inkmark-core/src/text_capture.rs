//! Inline text capture spawned by the text tool.
//!
//! A capture is armed on pointer-down, edited through key input and finished
//! by Enter or blur (commit if there is any non-whitespace text) or by Escape
//! (discard). The resulting [`TextMark`] goes through the same append path as
//! every other annotation.

use crate::annotations::{PageNumber, TextMark};
use crate::input::TextKey;
use kurbo::Point;

/// Lifecycle of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Created, not yet focused.
    Armed,
    /// Accepting input.
    Editing,
    Committed,
    Discarded,
}

/// How a finished capture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Commit(TextMark),
    Discarded,
}

/// Result of feeding a key to the capture.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyResult {
    /// Text may have changed; capture still editing.
    Handled,
    /// Key ignored (capture not editing).
    NotHandled,
    /// Capture finished.
    Finished(CaptureOutcome),
}

/// A pending text entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCapture {
    /// Page the capture was created on; kept across navigation.
    pub page: PageNumber,
    /// Baseline origin in document coordinates.
    pub anchor: Point,
    /// Where the input box sits on screen, device coordinates.
    pub screen_position: Point,
    pub font_size: f64,
    pub color: String,
    text: String,
    state: CaptureState,
}

impl TextCapture {
    /// Arm a capture. `font_size` is already in document units.
    pub fn arm(
        page: PageNumber,
        anchor: Point,
        screen_position: Point,
        font_size: f64,
        color: impl Into<String>,
    ) -> Self {
        Self {
            page,
            anchor,
            screen_position,
            font_size,
            color: color.into(),
            text: String::new(),
            state: CaptureState::Armed,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the capture can still change.
    pub fn is_open(&self) -> bool {
        matches!(self.state, CaptureState::Armed | CaptureState::Editing)
    }

    /// Move to editing.
    pub fn focus(&mut self) {
        if self.state == CaptureState::Armed {
            self.state = CaptureState::Editing;
        }
    }

    pub fn insert_str(&mut self, s: &str) {
        if self.state == CaptureState::Editing {
            self.text.push_str(s);
        }
    }

    pub fn backspace(&mut self) {
        if self.state == CaptureState::Editing {
            self.text.pop();
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.state == CaptureState::Editing {
            self.text = text.into();
        }
    }

    /// Feed a key press.
    pub fn handle_key(&mut self, key: TextKey) -> KeyResult {
        if self.state != CaptureState::Editing {
            return KeyResult::NotHandled;
        }
        match key {
            TextKey::Character(c) => self.insert_str(&c),
            TextKey::Backspace => self.backspace(),
            TextKey::Enter => return KeyResult::Finished(self.finish()),
            TextKey::Escape => return KeyResult::Finished(self.discard()),
        }
        KeyResult::Handled
    }

    /// Focus left the input box; same as Enter.
    pub fn blur(&mut self) -> CaptureOutcome {
        self.finish()
    }

    /// Drop the capture without committing.
    pub fn discard(&mut self) -> CaptureOutcome {
        if self.is_open() {
            log::debug!("Text capture on page {} discarded", self.page);
            self.state = CaptureState::Discarded;
        }
        CaptureOutcome::Discarded
    }

    fn finish(&mut self) -> CaptureOutcome {
        if !self.is_open() {
            return CaptureOutcome::Discarded;
        }
        if self.text.trim().is_empty() {
            return self.discard();
        }
        self.state = CaptureState::Committed;
        CaptureOutcome::Commit(TextMark::new(
            self.page,
            self.anchor,
            self.text.clone(),
            self.font_size,
            self.color.clone(),
        ))
    }
}
