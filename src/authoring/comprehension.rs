// src/authoring/comprehension.rs

use crate::{
    authoring::{IdGenerator, Publisher, non_empty},
    models::question::{ComprehensionQuestion, SubQuestion},
};

const MIN_OPTIONS: usize = 2;
const NEW_QUESTION_OPTIONS: usize = 4;

/// Editable reading-comprehension question.
pub struct ComprehensionDraft<F> {
    id: Option<String>,
    passage: String,
    questions: Vec<SubQuestion>,
    image_url: Option<String>,
    publisher: Publisher<ComprehensionQuestion, F>,
}

impl<F> ComprehensionDraft<F>
where
    F: FnMut(&ComprehensionQuestion),
{
    pub fn new(question: ComprehensionQuestion, on_change: F) -> Self {
        Self {
            id: question.id.clone(),
            passage: question.passage.clone(),
            questions: question.questions.clone(),
            image_url: question.image_url.clone(),
            publisher: Publisher::new(question, on_change),
        }
    }

    pub fn set_passage(&mut self, passage: &str) {
        self.passage = passage.to_string();
        self.changed();
    }

    /// Appends an empty sub-question with four blank options.
    pub fn add_question(&mut self, ids: &mut impl IdGenerator) -> String {
        let id = ids.next_id();
        self.questions.push(SubQuestion {
            id: id.clone(),
            question_text: String::new(),
            options: vec![String::new(); NEW_QUESTION_OPTIONS],
            correct_index: 0,
        });
        self.changed();
        id
    }

    pub fn remove_question(&mut self, index: usize) {
        if index < self.questions.len() {
            self.questions.remove(index);
            self.changed();
        }
    }

    pub fn set_question_text(&mut self, index: usize, text: &str) {
        if let Some(question) = self.questions.get_mut(index) {
            question.question_text = text.to_string();
            self.changed();
        }
    }

    pub fn set_option(&mut self, index: usize, option: usize, text: &str) {
        let Some(slot) = self
            .questions
            .get_mut(index)
            .and_then(|q| q.options.get_mut(option))
        else {
            return;
        };
        *slot = text.to_string();
        self.changed();
    }

    pub fn set_correct_index(&mut self, index: usize, correct: usize) {
        if let Some(question) = self.questions.get_mut(index) {
            question.correct_index = correct;
            self.changed();
        }
    }

    pub fn add_option(&mut self, index: usize) {
        if let Some(question) = self.questions.get_mut(index) {
            question.options.push(String::new());
            self.changed();
        }
    }

    /// Drops one option, keeping at least two.
    ///
    /// A correct index at or after the removed slot moves down by one.
    pub fn remove_option(&mut self, index: usize, option: usize) -> bool {
        let Some(question) = self.questions.get_mut(index) else {
            return false;
        };
        if question.options.len() <= MIN_OPTIONS || option >= question.options.len() {
            return false;
        }
        question.options.remove(option);
        if question.correct_index >= option {
            question.correct_index = question.correct_index.saturating_sub(1);
        }
        self.changed();
        true
    }

    pub fn set_image_url(&mut self, url: &str) {
        self.image_url = non_empty(url);
        self.changed();
    }

    /// What is wrong with sub-question `index`, if anything.
    pub fn question_problem(&self, index: usize) -> Option<String> {
        let question = self.questions.get(index)?;
        let n = index + 1;
        if question.question_text.trim().is_empty() {
            Some(format!("Question {n} text is required"))
        } else if question.options.len() < MIN_OPTIONS {
            Some(format!("Question {n} needs at least 2 options"))
        } else if question.options.iter().any(|o| o.trim().is_empty()) {
            Some(format!("Question {n} has empty options"))
        } else if question.correct_index >= question.options.len() {
            Some(format!("Question {n} has invalid correct answer"))
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation_message().is_none()
    }

    pub fn validation_message(&self) -> Option<&'static str> {
        if self.passage.trim().is_empty() {
            Some("Enter the reading passage")
        } else if self.questions.is_empty() {
            Some("Add at least one question")
        } else if (0..self.questions.len()).any(|i| self.question_problem(i).is_some()) {
            Some("Fix validation errors above")
        } else {
            None
        }
    }

    pub fn build(&self) -> ComprehensionQuestion {
        ComprehensionQuestion {
            id: self.id.clone(),
            passage: self.passage.clone(),
            questions: self.questions.clone(),
            image_url: self.image_url.clone(),
        }
    }

    /// Hands out the current state even if it is not valid yet.
    pub fn finish(mut self) -> ComprehensionQuestion {
        let question = self.build();
        self.publisher.force(question.clone());
        question
    }

    fn changed(&mut self) {
        let candidate = self.build();
        let valid = self.is_valid();
        self.publisher.offer(candidate, valid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    type Log = Rc<RefCell<Vec<ComprehensionQuestion>>>;

    fn draft() -> (Log, ComprehensionDraft<impl FnMut(&ComprehensionQuestion)>) {
        let log: Log = Rc::default();
        let sink = {
            let log = log.clone();
            move |q: &ComprehensionQuestion| log.borrow_mut().push(q.clone())
        };
        (log, ComprehensionDraft::new(ComprehensionQuestion::default(), sink))
    }

    fn ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("m{n}")
        }
    }

    /// A passage with one sub-question: "Pick" / ["a", "b", "c", "d"].
    fn filled() -> (Log, ComprehensionDraft<impl FnMut(&ComprehensionQuestion)>) {
        let (log, mut draft) = draft();
        let mut ids = ids();
        draft.set_passage("Once upon a time.");
        draft.add_question(&mut ids);
        draft.set_question_text(0, "Pick");
        for (slot, text) in ["a", "b", "c", "d"].into_iter().enumerate() {
            draft.set_option(0, slot, text);
        }
        (log, draft)
    }

    #[test]
    fn new_sub_questions_start_blank() {
        let (log, mut draft) = draft();
        let mut ids = ids();
        draft.set_passage("Once upon a time.");
        assert_eq!(draft.add_question(&mut ids), "m1");

        let built = draft.build();
        assert_eq!(built.questions[0].options, vec![""; 4]);
        assert_eq!(built.questions[0].correct_index, 0);
        assert_eq!(draft.validation_message(), Some("Fix validation errors above"));
        assert_eq!(draft.question_problem(0).as_deref(), Some("Question 1 text is required"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn emits_once_every_option_has_text() {
        let (log, draft) = filled();
        assert!(draft.is_valid());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn removing_an_option_shifts_the_correct_index() {
        let (_, mut draft) = filled();
        draft.set_correct_index(0, 2);

        assert!(draft.remove_option(0, 1));
        assert_eq!(draft.build().questions[0].correct_index, 1);
        assert_eq!(draft.build().questions[0].options, vec!["a", "c", "d"]);

        assert!(draft.remove_option(0, 0));
        assert_eq!(draft.build().questions[0].correct_index, 0);
        assert!(!draft.remove_option(0, 0));
        assert_eq!(draft.build().questions[0].options.len(), 2);
    }

    #[test]
    fn removing_an_option_after_the_correct_one_keeps_it() {
        let (_, mut draft) = filled();
        draft.set_correct_index(0, 1);
        assert!(draft.remove_option(0, 3));
        assert_eq!(draft.build().questions[0].correct_index, 1);
    }

    #[test]
    fn out_of_range_correct_index_is_flagged() {
        let (log, mut draft) = filled();
        let emitted = log.borrow().len();
        draft.set_correct_index(0, 9);
        assert_eq!(
            draft.question_problem(0).as_deref(),
            Some("Question 1 has invalid correct answer")
        );
        assert_eq!(log.borrow().len(), emitted);
    }
}
