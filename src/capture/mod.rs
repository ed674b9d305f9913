// src/capture/mod.rs

//! Answer capture engines.
//!
//! One engine per question type turns drag/drop or selection gestures into
//! the answer payload a submission carries. Every mutating operation
//! publishes the complete updated answer to the engine's [`AnswerSink`]
//! synchronously. State handed in by the host through
//! `apply_external_state` is never published back, so a host that feeds
//! published answers back into the engine cannot loop.

pub mod categorize;
pub mod cloze;
pub mod comprehension;

pub use categorize::CategorizeCapture;
pub use cloze::{BlankSummary, ClozeCapture, InputMode, Segment};
pub use comprehension::ComprehensionCapture;

/// Receives the full answer after every committed change.
pub trait AnswerSink<A: ?Sized> {
    fn publish(&mut self, answer: &A);
}

impl<A: ?Sized, F> AnswerSink<A> for F
where
    F: FnMut(&A),
{
    fn publish(&mut self, answer: &A) {
        self(answer)
    }
}

/// Cosmetic drag-session state: what is being dragged and what it hovers.
///
/// Never part of an answer. Cleared on drop and on cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    dragging: Option<String>,
    over: Option<String>,
}

impl DragState {
    pub fn start(&mut self, source: &str) {
        self.dragging = Some(source.to_string());
        self.over = None;
    }

    pub fn hover(&mut self, target: &str) {
        self.over = Some(target.to_string());
    }

    /// Ends the session, yielding the dragged source if there was one.
    pub fn finish(&mut self) -> Option<String> {
        self.over = None;
        self.dragging.take()
    }

    pub fn cancel(&mut self) {
        self.dragging = None;
        self.over = None;
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn over(&self) -> Option<&str> {
        self.over.as_deref()
    }
}
