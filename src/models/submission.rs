// src/models/submission.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'submissions' table in the database.
/// Immutable once written; removed only together with its form.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub form_id: String,

    /// Subject of the signed-in submitter, if any.
    pub user_id: Option<String>,

    pub answers: Json<Vec<SubmittedAnswer>>,

    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One answer of a submission.
///
/// `question_id` is the question's stable id when it has one, otherwise its
/// stringified position in the form. The payload shape depends on the
/// question type, see [`CategorizeAnswer`], [`ClozeAnswer`] and
/// [`ComprehensionAnswer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub answer: serde_json::Value,
}

/// Item id -> category name. Only placed items are present.
pub type CategorizeAnswer = BTreeMap<String, String>;

/// Blank id -> chosen or typed text.
pub type ClozeAnswer = BTreeMap<String, String>;

/// Selected option index per sub-question; unanswered slots are `None` (`null` on the wire).
pub type ComprehensionAnswer = Vec<Option<usize>>;

/// DTO for submitting a form.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    #[validate(length(min = 1, message = "At least one answer is required"))]
    pub answers: Vec<SubmittedAnswer>,
}

/// Query parameters for listing submissions.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmissionListParams {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}
