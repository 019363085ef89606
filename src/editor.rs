// src/editor.rs
use pgtk_core::{FrameId, InputEvent, PreeditImage};

/// Text of one frame plus whatever preedit the input method is showing in it
#[derive(Debug)]
pub struct EditorBuffer {
    frame: FrameId,
    text: String,
    preedit: Option<PreeditImage>,
}

impl EditorBuffer {
    pub fn new(frame: FrameId) -> Self {
        Self {
            frame,
            text: String::new(),
            preedit: None,
        }
    }

    pub fn frame(&self) -> FrameId {
        self.frame
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn preedit(&self) -> Option<&PreeditImage> {
        self.preedit.as_ref()
    }

    /// Apply one queued input event. Returns false for events aimed at
    /// another frame.
    pub fn apply(&mut self, event: InputEvent) -> bool {
        if event.frame() != self.frame {
            return false;
        }
        match event {
            InputEvent::CommittedText { text, .. } => self.text.push_str(&text),
            InputEvent::Preedit { image, .. } => self.preedit = image,
        }
        true
    }

    pub fn insert(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Last line of text, which is where the caret sits.
    pub fn current_line(&self) -> &str {
        self.text.rsplit('\n').next().unwrap_or_default()
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_own_frame_only() {
        let mut buffer = EditorBuffer::new(FrameId(1));
        assert!(buffer.apply(InputEvent::CommittedText { frame: FrameId(1), text: "漢".into() }));
        assert!(!buffer.apply(InputEvent::CommittedText { frame: FrameId(2), text: "字".into() }));
        assert_eq!(buffer.text(), "漢");
    }

    #[test]
    fn test_preedit_replaced_and_cleared() {
        let mut buffer = EditorBuffer::new(FrameId(1));
        buffer.apply(InputEvent::Preedit { frame: FrameId(1), image: Some(PreeditImage::new(8, 16)) });
        assert_eq!(buffer.preedit().map(|i| i.width()), Some(8));

        buffer.apply(InputEvent::Preedit { frame: FrameId(1), image: None });
        assert!(buffer.preedit().is_none());
    }

    #[test]
    fn test_lines() {
        let mut buffer = EditorBuffer::new(FrameId(1));
        for ch in "ab\ncd".chars() {
            buffer.insert(ch);
        }
        buffer.backspace();
        assert_eq!(buffer.current_line(), "c");
        assert_eq!(buffer.line_count(), 2);
    }
}
