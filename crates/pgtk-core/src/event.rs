//! Host-side input queue fed by the input-method session

use std::collections::VecDeque;

use crate::frame::FrameId;
use crate::preedit::PreeditImage;
use crate::traits::FrameEventSink;

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Composed text, to be inserted like typed input
    CommittedText { frame: FrameId, text: String },
    /// New preedit display for the frame; `None` clears it
    Preedit { frame: FrameId, image: Option<PreeditImage> },
}

impl InputEvent {
    pub fn frame(&self) -> FrameId {
        match self {
            InputEvent::CommittedText { frame, .. } | InputEvent::Preedit { frame, .. } => *frame,
        }
    }
}

/// FIFO of input events waiting for the editor's event loop
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl FrameEventSink for EventQueue {
    fn enqueue_committed_text(&mut self, frame: FrameId, text: &str) {
        tracing::trace!("Queue commit for {}: {:?}", frame, text);
        self.push(InputEvent::CommittedText { frame, text: text.to_string() });
    }

    fn enqueue_preedit_image(&mut self, frame: FrameId, image: Option<PreeditImage>) {
        tracing::trace!("Queue preedit for {}: {:?}", frame, image);
        self.push(InputEvent::Preedit { frame, image });
    }
}
