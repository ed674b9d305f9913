// src/authoring/cloze.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    authoring::{IdGenerator, Publisher, non_empty},
    models::question::{ClozeBlank, ClozeQuestion},
};

/// `__word__` markers typed by the author.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^_]+)__").expect("marker pattern is valid"));

/// The marker word that stands for "no hint".
const NO_HINT: &str = "blank";
const VISUAL_BLANK: &str = "___________";

/// Rewrites `__word__` markers into `[blank_id]` tokens, minting one blank per marker.
pub fn parse_marked_text(raw: &str, ids: &mut impl IdGenerator) -> (String, Vec<ClozeBlank>) {
    let mut blanks = Vec::new();
    let text = MARKER.replace_all(raw, |caps: &regex::Captures<'_>| {
        let id = format!("blank_{}", ids.next_id());
        let hint = caps[1].trim();
        blanks.push(ClozeBlank {
            id: id.clone(),
            answer_hint: (!hint.is_empty() && hint != NO_HINT).then(|| hint.to_string()),
        });
        format!("[{id}]")
    });
    (text.into_owned(), blanks)
}

/// Turns stored text back into the editable marker form.
pub fn to_marked_text(text: &str, blanks: &[ClozeBlank]) -> String {
    let mut ordered: Vec<(usize, &ClozeBlank)> = blanks
        .iter()
        .filter_map(|blank| text.find(&format!("[{}]", blank.id)).map(|at| (at, blank)))
        .collect();
    ordered.sort_by_key(|(at, _)| *at);

    let mut marked = text.to_string();
    for (_, blank) in ordered {
        let token = format!("[{}]", blank.id);
        let word = blank.answer_hint.as_deref().unwrap_or(NO_HINT);
        marked = marked.replacen(&token, &format!("__{word}__"), 1);
    }
    marked
}

/// Editable cloze question.
pub struct ClozeDraft<F> {
    id: Option<String>,
    raw_text: String,
    text: String,
    blanks: Vec<ClozeBlank>,
    options: Vec<String>,
    image_url: Option<String>,
    publisher: Publisher<ClozeQuestion, F>,
}

impl<F> ClozeDraft<F>
where
    F: FnMut(&ClozeQuestion),
{
    pub fn new(question: ClozeQuestion, on_change: F) -> Self {
        Self {
            id: question.id.clone(),
            raw_text: to_marked_text(&question.text, &question.blanks),
            text: question.text.clone(),
            blanks: question.blanks.clone(),
            options: question.options.clone().unwrap_or_default(),
            image_url: question.image_url.clone(),
            publisher: Publisher::new(question, on_change),
        }
    }

    /// Text as the author types it, with `__word__` markers.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Replaces the text. Every marker becomes a brand-new blank.
    pub fn set_text(&mut self, raw: &str, ids: &mut impl IdGenerator) {
        let (text, blanks) = parse_marked_text(raw, ids);
        self.raw_text = raw.to_string();
        self.text = text;
        self.blanks = blanks;
        self.changed();
    }

    pub fn set_blank_hint(&mut self, blank_id: &str, hint: &str) {
        if let Some(blank) = self.blanks.iter_mut().find(|b| b.id == blank_id) {
            blank.answer_hint = non_empty(hint);
            self.changed();
        }
    }

    /// Adds a pool option. Blank and duplicate values are refused.
    pub fn add_option(&mut self, option: &str) -> bool {
        let Some(option) = non_empty(option) else {
            return false;
        };
        if self.options.contains(&option) {
            return false;
        }
        self.options.push(option);
        self.changed();
        true
    }

    pub fn remove_option(&mut self, index: usize) {
        if index < self.options.len() {
            self.options.remove(index);
            self.changed();
        }
    }

    pub fn set_image_url(&mut self, url: &str) {
        self.image_url = non_empty(url);
        self.changed();
    }

    /// The text with every blank drawn as an underscore run.
    pub fn preview_text(&self) -> String {
        if self.raw_text.contains("__") {
            return MARKER.replace_all(&self.raw_text, VISUAL_BLANK).into_owned();
        }
        self.blanks.iter().fold(self.text.clone(), |preview, blank| {
            preview.replacen(&format!("[{}]", blank.id), VISUAL_BLANK, 1)
        })
    }

    pub fn is_valid(&self) -> bool {
        self.validation_message().is_none()
    }

    pub fn validation_message(&self) -> Option<&'static str> {
        if self.text.trim().is_empty() {
            Some("Enter text for the question")
        } else if self.blanks.is_empty() {
            Some("Add at least one blank using double underscores (__word__)")
        } else {
            None
        }
    }

    pub fn build(&self) -> ClozeQuestion {
        ClozeQuestion {
            id: self.id.clone(),
            text: self.text.clone(),
            blanks: self.blanks.clone(),
            image_url: self.image_url.clone(),
            options: (!self.options.is_empty()).then(|| self.options.clone()),
        }
    }

    /// Hands out the current state even if it is not valid yet.
    pub fn finish(mut self) -> ClozeQuestion {
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

    fn ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            n.to_string()
        }
    }

    type Log = Rc<RefCell<Vec<ClozeQuestion>>>;

    fn draft(question: ClozeQuestion) -> (Log, ClozeDraft<impl FnMut(&ClozeQuestion)>) {
        let log: Log = Rc::default();
        let sink = {
            let log = log.clone();
            move |q: &ClozeQuestion| log.borrow_mut().push(q.clone())
        };
        (log, ClozeDraft::new(question, sink))
    }

    #[test]
    fn markers_become_blanks() {
        let mut ids = ids();
        let (text, blanks) =
            parse_marked_text("The capital of France is __Paris__, of Peru __blank__.", &mut ids);

        assert_eq!(text, "The capital of France is [blank_1], of Peru [blank_2].");
        assert_eq!(blanks.len(), 2);
        assert_eq!(blanks[0].answer_hint.as_deref(), Some("Paris"));
        assert_eq!(blanks[1].answer_hint, None);
    }

    #[test]
    fn marked_text_follows_text_order() {
        let blanks = vec![
            ClozeBlank {
                id: "b2".into(),
                answer_hint: None,
            },
            ClozeBlank {
                id: "b1".into(),
                answer_hint: Some("red".into()),
            },
        ];
        assert_eq!(
            to_marked_text("Roses are [b1], sky is [b2].", &blanks),
            "Roses are __red__, sky is __blank__."
        );
    }

    #[test]
    fn text_without_markers_is_not_emitted() {
        let (log, mut draft) = draft(ClozeQuestion::default());
        let mut ids = ids();

        draft.set_text("No blanks here", &mut ids);
        assert_eq!(
            draft.validation_message(),
            Some("Add at least one blank using double underscores (__word__)")
        );
        assert!(log.borrow().is_empty());

        draft.set_text("One __blank__ here", &mut ids);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].text, "One [blank_1] here");
    }

    #[test]
    fn options_are_trimmed_and_deduplicated() {
        let (_, mut draft) = draft(ClozeQuestion::default());
        assert!(draft.add_option(" Paris "));
        assert!(!draft.add_option("Paris"));
        assert!(!draft.add_option("  "));
        assert_eq!(draft.build().options, Some(vec!["Paris".to_string()]));

        draft.remove_option(0);
        assert_eq!(draft.build().options, None);
    }

    #[test]
    fn preview_hides_the_answers() {
        let (_, mut draft) = draft(ClozeQuestion::default());
        let mut ids = ids();
        draft.set_text("Capital: __Paris__", &mut ids);
        assert_eq!(draft.preview_text(), "Capital: ___________");
    }

    #[test]
    fn hint_edits_are_emitted() {
        let (log, mut draft) = draft(ClozeQuestion::default());
        let mut ids = ids();
        draft.set_text("Capital: __Paris__", &mut ids);

        draft.set_blank_hint("blank_1", "   ");
        let question = draft.finish();
        assert_eq!(question.blanks[0].answer_hint, None);
        assert_eq!(log.borrow().len(), 3);
    }
}
