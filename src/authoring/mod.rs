// src/authoring/mod.rs

//! Authoring-side drafts.
//!
//! A draft holds an author's in-progress edits of one question. After each
//! edit it hands a complete replacement question to its callback, but only
//! when the local validity check passes and the result differs from what it
//! last handed out. The server re-validates everything on save regardless.

pub mod categorize;
pub mod cloze;
pub mod comprehension;
pub mod ids;

pub use categorize::CategorizeDraft;
pub use cloze::ClozeDraft;
pub use comprehension::ComprehensionDraft;
pub use ids::{IdGenerator, TimestampIds};

use crate::models::question::{
    CategorizeQuestion, ClozeQuestion, ComprehensionQuestion, Question,
};

/// Forwards a draft's result to its owner, skipping repeats.
struct Publisher<Q, F> {
    last: Q,
    on_change: F,
}

impl<Q, F> Publisher<Q, F>
where
    Q: Clone + PartialEq,
    F: FnMut(&Q),
{
    fn new(initial: Q, on_change: F) -> Self {
        Self {
            last: initial,
            on_change,
        }
    }

    fn offer(&mut self, candidate: Q, valid: bool) {
        if valid && candidate != self.last {
            (self.on_change)(&candidate);
            self.last = candidate;
        }
    }

    fn force(&mut self, candidate: Q) {
        (self.on_change)(&candidate);
        self.last = candidate;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Categorize,
    Cloze,
    Comprehension,
}

/// A fresh, empty question of `kind` carrying a newly minted stable id.
pub fn new_question(kind: QuestionKind, ids: &mut impl IdGenerator) -> Question {
    let id = Some(ids.next_id());
    match kind {
        QuestionKind::Categorize => Question::Categorize(CategorizeQuestion {
            id,
            ..Default::default()
        }),
        QuestionKind::Cloze => Question::Cloze(ClozeQuestion {
            id,
            ..Default::default()
        }),
        QuestionKind::Comprehension => Question::Comprehension(ComprehensionQuestion {
            id,
            ..Default::default()
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Swaps the question at `index` with its neighbour. Returns false at the edges.
pub fn move_question(questions: &mut [Question], index: usize, direction: Direction) -> bool {
    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => index.checked_add(1).filter(|&t| t < questions.len()),
    };
    match target {
        Some(target) if index < questions.len() => {
            questions.swap(index, target);
            true
        }
        _ => false,
    }
}

/// One-line description for question lists.
pub fn preview(question: &Question) -> String {
    match question {
        Question::Categorize(q) => format!(
            "Categorize question with {} categories and {} items",
            q.categories.len(),
            q.items.len()
        ),
        Question::Cloze(q) => {
            let head: String = q.text.chars().take(60).collect();
            let ellipsis = if q.text.chars().count() > 60 { "..." } else { "" };
            format!("Cloze question: {head}{ellipsis}")
        }
        Question::Comprehension(q) => format!(
            "Comprehension question with {} sub-questions",
            q.questions.len()
        ),
    }
}

/// Empty strings mean "no value" in editor fields.
fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
