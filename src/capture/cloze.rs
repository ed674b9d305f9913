// src/capture/cloze.rs

use std::collections::BTreeSet;

use crate::{
    capture::{AnswerSink, DragState},
    models::{
        question::{ClozeQuestion, placeholders},
        submission::ClozeAnswer,
    },
};

/// How a blank takes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Values are dragged from the question's option pool.
    DropTarget,
    /// No pool: every blank is a text field.
    FreeText,
}

/// A piece of rendered cloze text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Blank { id: &'a str, hint: Option<&'a str> },
}

/// One line of the "your answers" overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankSummary<'a> {
    /// 1-based.
    pub position: usize,
    pub id: &'a str,
    pub hint: Option<&'a str>,
    pub value: Option<&'a str>,
}

/// Captures a cloze answer: blank id -> chosen text.
///
/// A pool value sits in at most one blank. Assigning it elsewhere takes it
/// out of the blank it was in, which simply becomes empty again.
pub struct ClozeCapture<'q, S> {
    question: &'q ClozeQuestion,
    answers: ClozeAnswer,
    drag: DragState,
    sink: S,
}

impl<'q, S> ClozeCapture<'q, S>
where
    S: AnswerSink<ClozeAnswer>,
{
    pub fn new(question: &'q ClozeQuestion, initial: ClozeAnswer, sink: S) -> Self {
        Self {
            question,
            answers: initial,
            drag: DragState::default(),
            sink,
        }
    }

    pub fn assign(&mut self, blank_id: &str, value: &str) {
        self.answers.retain(|_, current| current != value);
        self.answers.insert(blank_id.to_string(), value.to_string());
        self.publish();
    }

    pub fn clear(&mut self, blank_id: &str) {
        self.answers.remove(blank_id);
        self.publish();
    }

    /// Text-field edit in free-text mode. An emptied field clears the blank.
    pub fn type_text(&mut self, blank_id: &str, value: &str) {
        if value.is_empty() {
            self.clear(blank_id);
        } else {
            self.assign(blank_id, value);
        }
    }

    pub fn used_values(&self) -> BTreeSet<&str> {
        self.answers.values().map(String::as_str).collect()
    }

    pub fn is_used(&self, value: &str) -> bool {
        self.answers.values().any(|v| v == value)
    }

    pub fn value(&self, blank_id: &str) -> Option<&str> {
        self.answers.get(blank_id).map(String::as_str)
    }

    pub fn answers(&self) -> &ClozeAnswer {
        &self.answers
    }

    pub fn input_mode(&self) -> InputMode {
        if self.question.option_pool().is_empty() {
            InputMode::FreeText
        } else {
            InputMode::DropTarget
        }
    }

    /// Splits the question text into literal runs and blank slots.
    ///
    /// A token without a matching blank is left in the surrounding text as is.
    pub fn segments(&self) -> Vec<Segment<'q>> {
        let text = self.question.text.as_str();
        let mut segments = Vec::new();
        let mut last = 0;

        for (span, token) in placeholders(text) {
            let Some(blank) = self.question.blank(token) else {
                continue;
            };
            if span.start > last {
                segments.push(Segment::Text(&text[last..span.start]));
            }
            segments.push(Segment::Blank {
                id: blank.id.as_str(),
                hint: blank.answer_hint.as_deref(),
            });
            last = span.end;
        }

        if last < text.len() {
            segments.push(Segment::Text(&text[last..]));
        }
        segments
    }

    pub fn blank_summary(&self) -> Vec<BlankSummary<'_>> {
        self.question
            .blanks
            .iter()
            .enumerate()
            .map(|(index, blank)| BlankSummary {
                position: index + 1,
                id: blank.id.as_str(),
                hint: blank.answer_hint.as_deref(),
                value: self.value(&blank.id),
            })
            .collect()
    }

    /// Replaces the answers with host state. Publishes nothing.
    pub fn apply_external_state(&mut self, answers: ClozeAnswer) {
        self.answers = answers;
        self.drag.cancel();
    }

    /// Starts dragging a pool option. Options already sitting in a blank are refused.
    pub fn begin_drag(&mut self, option: &str) -> bool {
        let in_pool = self.question.option_pool().iter().any(|o| o == option);
        if !in_pool || self.is_used(option) {
            return false;
        }
        self.drag.start(option);
        true
    }

    pub fn drag_over(&mut self, blank_id: &str) {
        self.drag.hover(blank_id);
    }

    pub fn drop_on(&mut self, blank_id: &str) -> bool {
        match self.drag.finish() {
            Some(option) => {
                self.assign(blank_id, &option);
                true
            }
            None => false,
        }
    }

    pub fn end_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn dragged_option(&self) -> Option<&str> {
        self.drag.dragging()
    }

    pub fn hovered_blank(&self) -> Option<&str> {
        self.drag.over()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn publish(&mut self) {
        self.sink.publish(&self.answers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::ClozeBlank;
    use std::{cell::RefCell, rc::Rc};

    fn question(options: Option<Vec<&str>>) -> ClozeQuestion {
        ClozeQuestion {
            id: None,
            text: "[b1] is the largest planet, [b2] is the red one.".into(),
            blanks: vec![
                ClozeBlank {
                    id: "b1".into(),
                    answer_hint: Some("gas giant".into()),
                },
                ClozeBlank {
                    id: "b2".into(),
                    answer_hint: None,
                },
            ],
            image_url: None,
            options: options.map(|o| o.into_iter().map(String::from).collect()),
        }
    }

    type Log = Rc<RefCell<Vec<ClozeAnswer>>>;

    fn recorder() -> (Log, impl FnMut(&ClozeAnswer)) {
        let log: Log = Rc::default();
        let sink = {
            let log = log.clone();
            move |answer: &ClozeAnswer| log.borrow_mut().push(answer.clone())
        };
        (log, sink)
    }

    #[test]
    fn reassigning_a_value_moves_it() {
        let q = question(Some(vec!["Jupiter", "Mars"]));
        let (log, sink) = recorder();
        let mut engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);

        engine.assign("b1", "X");
        engine.assign("b2", "X");

        assert_eq!(engine.value("b1"), None);
        assert_eq!(engine.value("b2"), Some("X"));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn used_values_never_repeat() {
        let q = question(Some(vec!["Jupiter", "Mars"]));
        let (_, sink) = recorder();
        let mut engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);

        engine.assign("b1", "Jupiter");
        engine.assign("b2", "Mars");
        engine.assign("b1", "Mars");
        engine.assign("b3", "Jupiter");

        let used = engine.used_values();
        assert_eq!(used.len(), engine.answers().len());
        assert_eq!(engine.value("b2"), None);
        assert!(engine.is_used("Jupiter"));
    }

    #[test]
    fn overwriting_a_blank_frees_the_old_value() {
        let q = question(Some(vec!["Jupiter", "Mars"]));
        let (_, sink) = recorder();
        let mut engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);

        engine.assign("b1", "Jupiter");
        engine.assign("b1", "Mars");
        assert!(!engine.is_used("Jupiter"));
        assert_eq!(engine.used_values().into_iter().collect::<Vec<_>>(), vec!["Mars"]);
    }

    #[test]
    fn clear_publishes_the_smaller_map() {
        let q = question(None);
        let (log, sink) = recorder();
        let mut engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);

        engine.assign("b1", "Jupiter");
        engine.clear("b1");

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert!(log[1].is_empty());
    }

    #[test]
    fn segments_alternate_text_and_blanks() {
        let q = question(None);
        let (_, sink) = recorder();
        let engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);

        assert_eq!(
            engine.segments(),
            vec![
                Segment::Blank { id: "b1", hint: Some("gas giant") },
                Segment::Text(" is the largest planet, "),
                Segment::Blank { id: "b2", hint: None },
                Segment::Text(" is the red one."),
            ]
        );
    }

    #[test]
    fn unknown_tokens_stay_literal() {
        let mut q = question(None);
        q.text = "A [ghost] and [b1]!".into();
        let (_, sink) = recorder();
        let engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);

        assert_eq!(
            engine.segments(),
            vec![
                Segment::Text("A [ghost] and "),
                Segment::Blank { id: "b1", hint: Some("gas giant") },
                Segment::Text("!"),
            ]
        );
    }

    #[test]
    fn input_mode_follows_the_pool() {
        let (_, sink) = recorder();
        let with_pool = question(Some(vec!["Mars"]));
        assert_eq!(
            ClozeCapture::new(&with_pool, ClozeAnswer::new(), sink).input_mode(),
            InputMode::DropTarget
        );

        let (_, sink) = recorder();
        let empty_pool = question(Some(vec![]));
        assert_eq!(
            ClozeCapture::new(&empty_pool, ClozeAnswer::new(), sink).input_mode(),
            InputMode::FreeText
        );
    }

    #[test]
    fn typed_text_uses_the_same_rules() {
        let q = question(None);
        let (log, sink) = recorder();
        let mut engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);

        engine.type_text("b1", "Jupiter");
        engine.type_text("b2", "Jupiter");
        assert_eq!(engine.value("b1"), None);

        engine.type_text("b2", "");
        assert!(engine.answers().is_empty());
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn external_state_is_applied_silently() {
        let q = question(Some(vec!["Jupiter", "Mars"]));
        let (log, sink) = recorder();
        let mut engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);

        let mut reset = ClozeAnswer::new();
        reset.insert("b2".into(), "Mars".into());
        engine.apply_external_state(reset);
        assert!(log.borrow().is_empty());
        assert_eq!(engine.value("b2"), Some("Mars"));

        engine.apply_external_state(ClozeAnswer::new());
        assert!(engine.answers().is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn dragging_a_used_option_is_refused() {
        let q = question(Some(vec!["Jupiter", "Mars"]));
        let (log, sink) = recorder();
        let mut engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);

        assert!(engine.begin_drag("Jupiter"));
        engine.drag_over("b1");
        assert_eq!(engine.hovered_blank(), Some("b1"));
        assert!(engine.drop_on("b1"));
        assert_eq!(engine.value("b1"), Some("Jupiter"));
        assert_eq!(engine.dragged_option(), None);

        assert!(!engine.begin_drag("Jupiter"));
        assert!(!engine.begin_drag("Pluto"));
        assert!(!engine.drop_on("b2"));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn summary_lists_every_blank() {
        let q = question(Some(vec!["Jupiter", "Mars"]));
        let (_, sink) = recorder();
        let mut engine = ClozeCapture::new(&q, ClozeAnswer::new(), sink);
        engine.assign("b2", "Mars");

        let summary = engine.blank_summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].position, 1);
        assert_eq!(summary[0].hint, Some("gas giant"));
        assert_eq!(summary[0].value, None);
        assert_eq!(summary[1].value, Some("Mars"));
    }
}
