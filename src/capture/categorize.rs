// src/capture/categorize.rs

use crate::{
    capture::{AnswerSink, DragState},
    models::{
        question::{CategorizeItem, CategorizeQuestion},
        submission::CategorizeAnswer,
    },
};

/// Captures a categorize answer: which item was dropped into which category.
///
/// Placement labels are not checked against the declared categories, and
/// host-supplied placements for unknown items are kept as they are.
pub struct CategorizeCapture<'q, S> {
    question: &'q CategorizeQuestion,
    placements: CategorizeAnswer,
    drag: DragState,
    sink: S,
}

impl<'q, S> CategorizeCapture<'q, S>
where
    S: AnswerSink<CategorizeAnswer>,
{
    pub fn new(question: &'q CategorizeQuestion, initial: CategorizeAnswer, sink: S) -> Self {
        Self {
            question,
            placements: initial,
            drag: DragState::default(),
            sink,
        }
    }

    /// Puts `item_id` into `category`, replacing any earlier placement.
    pub fn place_item(&mut self, item_id: &str, category: &str) {
        self.placements
            .insert(item_id.to_string(), category.to_string());
        self.publish();
    }

    /// Sends the item back to the pool. Publishes even if it was not placed.
    pub fn remove_item(&mut self, item_id: &str) {
        self.placements.remove(item_id);
        self.publish();
    }

    /// Items not placed anywhere yet, in question order.
    pub fn unplaced_items(&self) -> Vec<&'q CategorizeItem> {
        self.question
            .items
            .iter()
            .filter(|item| !self.placements.contains_key(&item.id))
            .collect()
    }

    /// Items currently placed in `category`, in question order.
    pub fn items_in_category(&self, category: &str) -> Vec<&'q CategorizeItem> {
        self.question
            .items
            .iter()
            .filter(|item| self.placements.get(&item.id).map(String::as_str) == Some(category))
            .collect()
    }

    pub fn all_placed(&self) -> bool {
        self.unplaced_items().is_empty()
    }

    pub fn placements(&self) -> &CategorizeAnswer {
        &self.placements
    }

    /// Replaces the placements with host state. Publishes nothing.
    pub fn apply_external_state(&mut self, placements: CategorizeAnswer) {
        self.placements = placements;
        self.drag.cancel();
    }

    /// Starts dragging an item from the pool. Unknown or already placed items are refused.
    pub fn begin_drag(&mut self, item_id: &str) -> bool {
        if self.question.item(item_id).is_none() || self.placements.contains_key(item_id) {
            return false;
        }
        self.drag.start(item_id);
        true
    }

    pub fn drag_over(&mut self, category: &str) {
        self.drag.hover(category);
    }

    /// Drops the dragged item on `category`. Returns whether anything was placed.
    pub fn drop_on(&mut self, category: &str) -> bool {
        match self.drag.finish() {
            Some(item_id) => {
                self.place_item(&item_id, category);
                true
            }
            None => false,
        }
    }

    pub fn end_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn dragged_item(&self) -> Option<&str> {
        self.drag.dragging()
    }

    pub fn hovered_category(&self) -> Option<&str> {
        self.drag.over()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn publish(&mut self) {
        self.sink.publish(&self.placements);
    }
}
