// src/review.rs

//! Side-by-side inspection of a submission against its form.
//!
//! Categorize items with a correct category and comprehension sub-questions
//! are gradable. Cloze blanks carry only a hint, so they are listed but never
//! scored.

use serde::Serialize;
use serde_json::Value;

use crate::models::{
    form::Form,
    question::{CategorizeQuestion, ClozeQuestion, ComprehensionQuestion, Question},
    submission::{CategorizeAnswer, ClozeAnswer, ComprehensionAnswer, Submission, SubmittedAnswer},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReview {
    pub questions: Vec<QuestionReview>,
    pub gradable_count: usize,
    pub correct_count: usize,
    /// Percentage of gradable parts answered correctly.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReview {
    /// 1-based position in the form.
    pub position: usize,
    /// Key the answer was looked up under.
    pub question_id: String,
    pub answered: bool,
    #[serde(flatten)]
    pub detail: ReviewDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReviewDetail {
    Categorize { items: Vec<ItemReview> },
    Cloze { blanks: Vec<BlankReview> },
    Comprehension { questions: Vec<SubQuestionReview> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReview {
    pub item_id: String,
    pub text: String,
    pub placed_category: Option<String>,
    pub correct_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankReview {
    pub blank_id: String,
    pub position: usize,
    pub hint: Option<String>,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuestionReview {
    pub id: String,
    pub question_text: String,
    pub selected_index: Option<usize>,
    pub correct_index: usize,
    pub is_correct: bool,
}

/// Pairs every question of `form` with its answer in `submission`.
pub fn review_submission(form: &Form, submission: &Submission) -> SubmissionReview {
    let mut gradable_count = 0;
    let mut correct_count = 0;

    let question_count = form.questions.len();
    let questions = form
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let (key, answer) = find_answer(question, index, question_count, &submission.answers);
            let (detail, answered) = match question {
                Question::Categorize(q) => {
                    let placements = answer.and_then(parse::<CategorizeAnswer>);
                    let answered = placements.as_ref().is_some_and(|p| !p.is_empty());
                    (review_categorize(q, placements.unwrap_or_default()), answered)
                }
                Question::Cloze(q) => {
                    let filled = answer.and_then(parse::<ClozeAnswer>);
                    let answered = filled.as_ref().is_some_and(|f| !f.is_empty());
                    (review_cloze(q, filled.unwrap_or_default()), answered)
                }
                Question::Comprehension(q) => {
                    let selections = answer.and_then(parse::<ComprehensionAnswer>);
                    let answered = selections.as_ref().is_some_and(|s| s.iter().any(Option::is_some));
                    (review_comprehension(q, selections.unwrap_or_default()), answered)
                }
            };

            let (gradable, correct) = tally(&detail);
            gradable_count += gradable;
            correct_count += correct;

            QuestionReview {
                position: index + 1,
                question_id: key,
                answered,
                detail,
            }
        })
        .collect();

    SubmissionReview {
        questions,
        gradable_count,
        correct_count,
        score: calculate_score(correct_count, gradable_count),
    }
}

/// Looks the answer up by the question's stable id, then by its position.
/// A numeric id that names another question's position is only read as that
/// position.
fn find_answer<'a>(
    question: &Question,
    index: usize,
    question_count: usize,
    answers: &'a [SubmittedAnswer],
) -> (String, Option<&'a Value>) {
    let positional = index.to_string();
    let lookup = |key: &str| {
        answers
            .iter()
            .find(|a| a.question_id == key)
            .map(|a| &a.answer)
    };

    let names_other_position = |id: &str| {
        id.parse::<usize>()
            .is_ok_and(|position| position != index && position < question_count)
    };

    if let Some(id) = question.id()
        && !names_other_position(id)
        && let Some(answer) = lookup(id)
    {
        return (id.to_string(), Some(answer));
    }
    let key = question.id().map_or_else(|| positional.clone(), str::to_string);
    match lookup(&positional) {
        Some(answer) => (positional, Some(answer)),
        None => (key, None),
    }
}

/// Wrong-shaped payloads read as "no answer".
fn parse<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

fn review_categorize(question: &CategorizeQuestion, placements: CategorizeAnswer) -> ReviewDetail {
    let items = question
        .items
        .iter()
        .map(|item| {
            let placed = placements.get(&item.id).cloned();
            let is_correct = item
                .correct_category
                .as_ref()
                .map(|correct| placed.as_ref() == Some(correct));
            ItemReview {
                item_id: item.id.clone(),
                text: item.text.clone(),
                placed_category: placed,
                correct_category: item.correct_category.clone(),
                is_correct,
            }
        })
        .collect();
    ReviewDetail::Categorize { items }
}

fn review_cloze(question: &ClozeQuestion, filled: ClozeAnswer) -> ReviewDetail {
    let blanks = question
        .blanks
        .iter()
        .enumerate()
        .map(|(index, blank)| BlankReview {
            blank_id: blank.id.clone(),
            position: index + 1,
            hint: blank.answer_hint.clone(),
            answer: filled.get(&blank.id).cloned(),
        })
        .collect();
    ReviewDetail::Cloze { blanks }
}

fn review_comprehension(
    question: &ComprehensionQuestion,
    selections: ComprehensionAnswer,
) -> ReviewDetail {
    let questions = question
        .questions
        .iter()
        .enumerate()
        .map(|(index, sub)| {
            let selected = selections.get(index).copied().flatten();
            SubQuestionReview {
                id: sub.id.clone(),
                question_text: sub.question_text.clone(),
                selected_index: selected,
                correct_index: sub.correct_index,
                is_correct: selected == Some(sub.correct_index),
            }
        })
        .collect();
    ReviewDetail::Comprehension { questions }
}

/// Returns (gradable, correct) for one question.
fn tally(detail: &ReviewDetail) -> (usize, usize) {
    match detail {
        ReviewDetail::Categorize { items } => {
            let graded: Vec<bool> = items.iter().filter_map(|i| i.is_correct).collect();
            (graded.len(), graded.iter().filter(|&&ok| ok).count())
        }
        ReviewDetail::Cloze { .. } => (0, 0),
        ReviewDetail::Comprehension { questions } => (
            questions.len(),
            questions.iter().filter(|q| q.is_correct).count(),
        ),
    }
}

/// Percentage of correct answers; 0 when there is nothing to grade.
fn calculate_score(correct: usize, gradable: usize) -> f64 {
    if gradable == 0 {
        return 0.0;
    }
    (correct as f64 / gradable as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::types::Json;

    fn form(questions: Value) -> Form {
        Form {
            id: "f1".into(),
            title: "Quiz".into(),
            description: String::new(),
            header_image_url: None,
            owner_id: "owner".into(),
            questions: Json(serde_json::from_value(questions).unwrap()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn submission(answers: Value) -> Submission {
        Submission {
            id: "s1".into(),
            form_id: "f1".into(),
            user_id: None,
            answers: Json(serde_json::from_value(answers).unwrap()),
            submitted_at: chrono::Utc::now(),
            ip_address: None,
            user_agent: None,
        }
    }

    #[test]
    fn test_calculate_score_empty() {
        assert_eq!(calculate_score(0, 0), 0.0);
    }

    #[test]
    fn test_calculate_score_partial() {
        assert_eq!(calculate_score(1, 4), 25.0);
    }

    #[test]
    fn comprehension_answer_is_graded_by_position() {
        let form = form(json!([{
            "type": "comprehension",
            "passage": "The fox is brown.",
            "questions": [{
                "id": "m1",
                "questionText": "Colour?",
                "options": ["Red", "Brown"],
                "correctIndex": 1
            }]
        }]));
        let submission = submission(json!([{ "questionId": "0", "answer": [1] }]));

        let review = review_submission(&form, &submission);
        assert_eq!(review.gradable_count, 1);
        assert_eq!(review.correct_count, 1);
        assert_eq!(review.score, 100.0);
        assert!(review.questions[0].answered);
        assert_eq!(review.questions[0].question_id, "0");
    }

    #[test]
    fn stable_id_wins_over_position() {
        let form = form(json!([{
            "type": "categorize",
            "id": "q-1",
            "categories": ["Fruits", "Vegetables"],
            "items": [
                { "id": "i1", "text": "Apple", "correctCategory": "Fruits" },
                { "id": "i2", "text": "Carrot", "correctCategory": "Vegetables" },
                { "id": "i3", "text": "Stone" }
            ]
        }]));
        let submission = submission(json!([
            { "questionId": "0", "answer": { "i1": "Vegetables" } },
            { "questionId": "q-1", "answer": { "i1": "Fruits", "i2": "Fruits", "i3": "Fruits" } }
        ]));

        let review = review_submission(&form, &submission);
        assert_eq!(review.questions[0].question_id, "q-1");
        assert_eq!(review.gradable_count, 2);
        assert_eq!(review.correct_count, 1);
        assert_eq!(review.score, 50.0);

        let ReviewDetail::Categorize { items } = &review.questions[0].detail else {
            panic!("expected categorize detail");
        };
        assert_eq!(items[2].is_correct, None);
        assert_eq!(items[1].placed_category.as_deref(), Some("Fruits"));
    }

    #[test]
    fn numeric_id_does_not_steal_a_positional_answer() {
        let form = form(json!([
            {
                "type": "comprehension",
                "id": "1",
                "passage": "Text",
                "questions": [{ "id": "m1", "questionText": "Pick", "options": ["a", "b"], "correctIndex": 0 }]
            },
            {
                "type": "comprehension",
                "passage": "Text",
                "questions": [{ "id": "m1", "questionText": "Pick", "options": ["a", "b"], "correctIndex": 1 }]
            }
        ]));
        let submission = submission(json!([
            { "questionId": "0", "answer": [0] },
            { "questionId": "1", "answer": [1] }
        ]));

        let review = review_submission(&form, &submission);
        assert_eq!(review.questions[0].question_id, "0");
        assert_eq!(review.questions[1].question_id, "1");
        assert_eq!(review.correct_count, 2);
        assert_eq!(review.score, 100.0);
    }

    #[test]
    fn cloze_is_listed_but_not_scored() {
        let form = form(json!([{
            "type": "cloze",
            "text": "Capital: [b1]",
            "blanks": [{ "id": "b1", "answerHint": "Paris" }]
        }]));
        let submission = submission(json!([{ "questionId": "0", "answer": { "b1": "Paris" } }]));

        let review = review_submission(&form, &submission);
        assert_eq!(review.gradable_count, 0);
        assert_eq!(review.score, 0.0);
        let ReviewDetail::Cloze { blanks } = &review.questions[0].detail else {
            panic!("expected cloze detail");
        };
        assert_eq!(blanks[0].position, 1);
        assert_eq!(blanks[0].answer.as_deref(), Some("Paris"));
    }

    #[test]
    fn wrong_shape_counts_as_unanswered() {
        let form = form(json!([{
            "type": "comprehension",
            "passage": "p",
            "questions": [{ "id": "m1", "questionText": "q", "options": ["a", "b"], "correctIndex": 0 }]
        }]));
        let submission = submission(json!([{ "questionId": "0", "answer": "zero" }]));

        let review = review_submission(&form, &submission);
        assert!(!review.questions[0].answered);
        assert_eq!(review.gradable_count, 1);
        assert_eq!(review.correct_count, 0);
    }

    #[test]
    fn review_serializes_with_type_tag() {
        let form = form(json!([{
            "type": "cloze",
            "text": "[b1]",
            "blanks": [{ "id": "b1" }]
        }]));
        let review = review_submission(&form, &submission(json!([])));
        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["questions"][0]["type"], "cloze");
        assert_eq!(value["questions"][0]["position"], 1);
        assert_eq!(value["gradableCount"], 0);
    }
}
