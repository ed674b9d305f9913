// src/capture/comprehension.rs

use crate::{
    capture::AnswerSink,
    models::{question::ComprehensionQuestion, submission::ComprehensionAnswer},
};

/// Captures single-choice selections, one slot per sub-question.
///
/// A selection can be changed but never withdrawn.
pub struct ComprehensionCapture<'q, S> {
    question: &'q ComprehensionQuestion,
    selections: ComprehensionAnswer,
    sink: S,
}

impl<'q, S> ComprehensionCapture<'q, S>
where
    S: AnswerSink<ComprehensionAnswer>,
{
    pub fn new(question: &'q ComprehensionQuestion, initial: ComprehensionAnswer, sink: S) -> Self {
        Self {
            question,
            selections: initial,
            sink,
        }
    }

    /// Records `option_index` for sub-question `sub_question` and publishes the whole array.
    /// Slots before it that were never answered stay `None`. Indices past the
    /// last sub-question are ignored.
    pub fn select(&mut self, sub_question: usize, option_index: usize) {
        if sub_question >= self.question.questions.len() {
            return;
        }
        if self.selections.len() <= sub_question {
            self.selections.resize(sub_question + 1, None);
        }
        self.selections[sub_question] = Some(option_index);
        self.sink.publish(&self.selections);
    }

    pub fn selected(&self, sub_question: usize) -> Option<usize> {
        self.selections.get(sub_question).copied().flatten()
    }

    /// `None` while the sub-question is unanswered or does not exist.
    pub fn is_correct(&self, sub_question: usize) -> Option<bool> {
        let expected = self.question.questions.get(sub_question)?.correct_index;
        self.selected(sub_question).map(|chosen| chosen == expected)
    }

    pub fn answered_count(&self) -> usize {
        self.selections.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn selections(&self) -> &ComprehensionAnswer {
        &self.selections
    }

    /// Replaces the selections with host state. Publishes nothing.
    pub fn apply_external_state(&mut self, selections: ComprehensionAnswer) {
        self.selections = selections;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
