// src/models/form.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::models::question::Question;

/// Represents the 'forms' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,

    pub title: String,

    /// Empty string when the owner left it out.
    pub description: String,

    pub header_image_url: Option<String>,

    /// Identity-provider subject of the creator. Only the owner may mutate the form.
    pub owner_id: String,

    /// Ordered questions, stored as a JSON array.
    pub questions: Json<Vec<Question>>,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Listing row: everything except the questions themselves.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub header_image_url: Option<String>,
    pub question_count: i64,
    pub owner_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Typed body of a create/update request.
///
/// Only deserialized after the raw payload passed `validation::validate_form_payload`,
/// so the question shapes are already known to be sound here.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormPayload {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title cannot exceed 200 characters"
    ))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub header_image_url: Option<String>,

    #[serde(default)]
    pub questions: Vec<Question>,
}

impl FormPayload {
    /// Trims title and description the way they are persisted. An empty
    /// header image url is stored as no image.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.map(|d| d.trim().to_string());
        self.header_image_url = self.header_image_url.filter(|url| !url.is_empty());
        self
    }
}

/// Query parameters for the form listings.
#[derive(Debug, Deserialize, Validate)]
pub struct FormListParams {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_is_trimmed_before_length_checks() {
        let payload: FormPayload = serde_json::from_value(json!({
            "title": "   Quiz   ",
            "description": "  about things ",
            "questions": []
        }))
        .unwrap();

        let payload = payload.normalized();
        assert_eq!(payload.title, "Quiz");
        assert_eq!(payload.description.as_deref(), Some("about things"));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn empty_header_image_becomes_none() {
        let payload: FormPayload = serde_json::from_value(json!({
            "title": "Quiz",
            "headerImageUrl": "",
            "questions": []
        }))
        .unwrap();

        assert_eq!(payload.normalized().header_image_url, None);
    }

    #[test]
    fn overlong_title_is_rejected() {
        let payload: FormPayload = serde_json::from_value(json!({
            "title": "x".repeat(201),
            "questions": []
        }))
        .unwrap();

        assert!(payload.normalized().validate().is_err());
    }

    #[test]
    fn limit_is_bounded() {
        let params = FormListParams {
            page: Some(1),
            limit: Some(500),
            search: None,
        };
        assert!(params.validate().is_err());
    }
}
