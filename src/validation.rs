// src/validation.rs

//! Structural validation of form create/update payloads.
//!
//! Runs over the raw JSON body before anything is deserialized or persisted.
//! It never fails: every violation found is collected into the report so a
//! client can show all problems at once. Positions in messages are 1-based.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::question::placeholders;

/// Outcome of [`validate_form_payload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates a raw form payload.
///
/// Checks run in a fixed order: title, description, header image, the
/// questions array, then each question by its `type`. A missing questions
/// array stops the run early since nothing after it can be checked.
pub fn validate_form_payload(payload: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    if non_blank_str(payload.get("title")).is_none() {
        errors.push("Title is required and must be a non-empty string".to_string());
    }

    if !matches!(
        payload.get("description"),
        None | Some(Value::Null) | Some(Value::String(_))
    ) {
        errors.push("Description must be a string".to_string());
    }

    if !matches!(
        payload.get("headerImageUrl"),
        None | Some(Value::Null) | Some(Value::String(_))
    ) {
        errors.push("Header image URL must be a string or null".to_string());
    }

    let Some(questions) = payload.get("questions").and_then(Value::as_array) else {
        errors.push("Questions must be an array".to_string());
        return ValidationReport::from_errors(errors);
    };

    for (index, question) in questions.iter().enumerate() {
        let prefix = format!("Question {}", index + 1);

        let Some(question) = question.as_object() else {
            errors.push(format!("{prefix}: Must be an object"));
            continue;
        };

        match question.get("type").and_then(Value::as_str) {
            Some("categorize") => validate_categorize(question, &prefix, &mut errors),
            Some("cloze") => validate_cloze(question, &prefix, &mut errors),
            Some("comprehension") => validate_comprehension(question, &prefix, &mut errors),
            _ => {
                errors.push(format!(
                    "{prefix}: Type must be 'categorize', 'cloze', or 'comprehension'"
                ));
                continue;
            }
        }

        if !is_optional_str(question.get("id")) {
            errors.push(format!("{prefix}: ID must be a string if provided"));
        }
    }

    ValidationReport::from_errors(errors)
}

fn validate_categorize(question: &Map<String, Value>, prefix: &str, errors: &mut Vec<String>) {
    let categories = question.get("categories").and_then(Value::as_array);

    match categories {
        None => errors.push(format!("{prefix}: Categories must be an array")),
        Some(categories) => {
            if categories.is_empty() {
                errors.push(format!("{prefix}: Must have at least one category"));
            }
            for (index, category) in categories.iter().enumerate() {
                if non_blank_str(Some(category)).is_none() {
                    errors.push(format!(
                        "{prefix}: Category {} must be a non-empty string",
                        index + 1
                    ));
                }
            }
        }
    }

    match question.get("items").and_then(Value::as_array) {
        None => errors.push(format!("{prefix}: Items must be an array")),
        Some(items) => {
            let mut seen_ids = HashSet::new();

            for (index, item) in items.iter().enumerate() {
                let item_prefix = format!("{prefix}, Item {}", index + 1);

                let Some(item) = item.as_object() else {
                    errors.push(format!("{item_prefix}: Must be an object"));
                    continue;
                };

                match non_empty_str(item.get("id")) {
                    None => errors.push(format!(
                        "{item_prefix}: ID is required and must be a string"
                    )),
                    Some(id) => {
                        if !seen_ids.insert(id) {
                            errors.push(format!(
                                "{item_prefix}: ID '{id}' is already used by another item"
                            ));
                        }
                    }
                }

                if non_blank_str(item.get("text")).is_none() {
                    errors.push(format!(
                        "{item_prefix}: Text is required and must be a non-empty string"
                    ));
                }

                match item.get("correctCategory") {
                    None => {}
                    Some(Value::String(correct)) => {
                        let known = categories
                            .map(|cats| cats.iter().any(|c| c.as_str() == Some(correct.as_str())))
                            .unwrap_or(true);
                        if !known {
                            errors.push(format!(
                                "{item_prefix}: Correct category '{correct}' must be one of the defined categories"
                            ));
                        }
                    }
                    Some(_) => errors.push(format!(
                        "{item_prefix}: Correct category must be a string if provided"
                    )),
                }
            }
        }
    }

    check_image_url(question, prefix, errors);
}

fn validate_cloze(question: &Map<String, Value>, prefix: &str, errors: &mut Vec<String>) {
    let text = non_blank_str(question.get("text"));
    if text.is_none() {
        errors.push(format!(
            "{prefix}: Text is required and must be a non-empty string"
        ));
    }

    check_image_url(question, prefix, errors);

    match question.get("blanks").and_then(Value::as_array) {
        None => errors.push(format!("{prefix}: Blanks must be an array")),
        Some(blanks) => {
            for (index, blank) in blanks.iter().enumerate() {
                let blank_prefix = format!("{prefix}, Blank {}", index + 1);

                let Some(blank) = blank.as_object() else {
                    errors.push(format!("{blank_prefix}: Must be an object"));
                    continue;
                };

                if non_empty_str(blank.get("id")).is_none() {
                    errors.push(format!(
                        "{blank_prefix}: ID is required and must be a string"
                    ));
                }

                if !is_optional_str(blank.get("answerHint")) {
                    errors.push(format!(
                        "{blank_prefix}: Answer hint must be a string if provided"
                    ));
                }
            }

            if let Some(text) = text {
                let known: HashSet<&str> = blanks
                    .iter()
                    .filter_map(|blank| blank.get("id").and_then(Value::as_str))
                    .collect();

                for (_, token) in placeholders(text) {
                    if !known.contains(token) {
                        errors.push(format!(
                            "{prefix}: Blank ID '{token}' in text not found in blanks array"
                        ));
                    }
                }
            }
        }
    }

    match question.get("options") {
        None => {}
        Some(Value::Array(options)) if options.iter().all(Value::is_string) => {}
        Some(_) => errors.push(format!(
            "{prefix}: Options must be an array of strings if provided"
        )),
    }
}

fn validate_comprehension(question: &Map<String, Value>, prefix: &str, errors: &mut Vec<String>) {
    if non_blank_str(question.get("passage")).is_none() {
        errors.push(format!(
            "{prefix}: Passage is required and must be a non-empty string"
        ));
    }

    match question.get("questions").and_then(Value::as_array) {
        None => errors.push(format!("{prefix}: Questions must be an array")),
        Some(sub_questions) => {
            if sub_questions.is_empty() {
                errors.push(format!("{prefix}: Must have at least one question"));
            }

            for (index, mcq) in sub_questions.iter().enumerate() {
                let mcq_prefix = format!("{prefix}, MCQ {}", index + 1);

                let Some(mcq) = mcq.as_object() else {
                    errors.push(format!("{mcq_prefix}: Must be an object"));
                    continue;
                };

                if non_empty_str(mcq.get("id")).is_none() {
                    errors.push(format!("{mcq_prefix}: ID is required and must be a string"));
                }

                if non_blank_str(mcq.get("questionText")).is_none() {
                    errors.push(format!(
                        "{mcq_prefix}: Question text is required and must be a non-empty string"
                    ));
                }

                let Some(options) = mcq.get("options").and_then(Value::as_array) else {
                    errors.push(format!("{mcq_prefix}: Options must be an array"));
                    continue;
                };

                if options.len() < 2 {
                    errors.push(format!("{mcq_prefix}: Must have at least 2 options"));
                }

                for (option_index, option) in options.iter().enumerate() {
                    if non_blank_str(Some(option)).is_none() {
                        errors.push(format!(
                            "{mcq_prefix}, Option {}: Must be a non-empty string",
                            option_index + 1
                        ));
                    }
                }

                match mcq.get("correctIndex").and_then(as_integer) {
                    None => errors.push(format!(
                        "{mcq_prefix}: Correct index must be an integer"
                    )),
                    Some(correct) => {
                        let len = options.len() as i64;
                        if correct < 0 || correct >= len {
                            errors.push(format!(
                                "{mcq_prefix}: Correct index must be between 0 and {}",
                                len - 1
                            ));
                        }
                    }
                }
            }
        }
    }

    check_image_url(question, prefix, errors);
}

fn check_image_url(question: &Map<String, Value>, prefix: &str, errors: &mut Vec<String>) {
    if !is_optional_str(question.get("imageUrl")) {
        errors.push(format!("{prefix}: Image URL must be a string if provided"));
    }
}

/// A string that is not empty once trimmed.
fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// A string that is not empty (whitespace allowed).
fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Absent, or present as a string. An explicit `null` does not count as absent.
fn is_optional_str(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::String(_)))
}

/// Whole numbers only; `2.0` counts, `2.5` does not.
fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    if number.is_u64() {
        return Some(i64::MAX);
    }
    number
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}
