// src/handlers/submissions.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json as SqlJson};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::forms::{fetch_form, parse_id},
    models::{
        response::{ApiResponse, PageRequest},
        submission::{CreateSubmissionRequest, Submission, SubmissionListParams},
    },
    review::{SubmissionReview, review_submission},
    utils::{
        jwt::{AuthUser, MaybeUser},
        request_meta::RequestMeta,
    },
};

/// A submission next to its per-question review.
#[derive(Debug, Serialize)]
pub struct SubmissionDetail {
    pub submission: Submission,
    pub review: SubmissionReview,
}

/// Checks the `answers` array before it is deserialized, so a client gets
/// every malformed entry listed instead of the first serde error.
fn check_answers(payload: &Value) -> Result<(), AppError> {
    let answers = payload
        .get("answers")
        .and_then(Value::as_array)
        .filter(|answers| !answers.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("Answers are required and must be a non-empty array".to_string())
        })?;

    let mut errors = Vec::new();
    for (index, answer) in answers.iter().enumerate() {
        let n = index + 1;
        if !answer.get("questionId").is_some_and(Value::is_string) {
            errors.push(format!("Answer {}: questionId is required and must be a string", n));
        }
        if answer.get("answer").is_none_or(Value::is_null) {
            errors.push(format!("Answer {}: answer is required", n));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation("Validation failed", errors))
    }
}

/// Submit answers to a form. Open to anonymous callers.
pub async fn submit_form(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    user: MaybeUser,
    meta: RequestMeta,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "form")?;
    let form = fetch_form(&pool, &id).await?;

    check_answers(&payload)?;
    let request = serde_json::from_value::<CreateSubmissionRequest>(payload)?;
    request.validate()?;

    let submission = Submission {
        id: Uuid::new_v4().to_string(),
        form_id: form.id,
        user_id: user.id().map(str::to_string),
        answers: SqlJson(request.answers),
        submitted_at: chrono::Utc::now(),
        ip_address: meta.ip_address,
        user_agent: meta.user_agent,
    };

    sqlx::query(
        r#"
        INSERT INTO submissions (id, form_id, user_id, answers, submitted_at, ip_address, user_agent)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&submission.id)
    .bind(&submission.form_id)
    .bind(&submission.user_id)
    .bind(&submission.answers)
    .bind(submission.submitted_at)
    .bind(&submission.ip_address)
    .bind(&submission.user_agent)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store submission for form {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(
        "Submission {} stored for form {} ({} answers)",
        submission.id,
        submission.form_id,
        submission.answers.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Form submitted successfully", submission)),
    ))
}

/// List submissions of a form.
/// The owner sees every submission, anyone else only their own.
pub async fn list_submissions(
    State(pool): State<SqlitePool>,
    user: AuthUser,
    Path(id): Path<String>,
    Query(params): Query<SubmissionListParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let id = parse_id(&id, "form")?;
    let form = fetch_form(&pool, &id).await?;
    let page = PageRequest::new(params.page, params.limit);

    let submitter = (form.owner_id != user.id()).then(|| user.id());
    let filter = |builder: &mut QueryBuilder<'_, Sqlite>| {
        builder.push(" WHERE form_id = ").push_bind(form.id.clone());
        if let Some(submitter) = submitter {
            builder.push(" AND user_id = ").push_bind(submitter.to_string());
        }
    };

    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM submissions");
    filter(&mut count_query);
    let total: i64 = count_query.build_query_scalar().fetch_one(&pool).await?;

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, form_id, user_id, answers, submitted_at, ip_address, user_agent FROM submissions",
    );
    filter(&mut query);
    query
        .push(" ORDER BY submitted_at DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

    let submissions: Vec<Submission> = query
        .build_query_as()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list submissions for form {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(ApiResponse::paginated(
        "Submissions retrieved successfully",
        submissions,
        page.pagination(total),
    )))
}

/// Get one submission with its review.
/// Visible to the form owner and to whoever submitted it.
pub async fn get_submission(
    State(pool): State<SqlitePool>,
    user: AuthUser,
    Path((id, submission_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "form")?;
    let submission_id = parse_id(&submission_id, "submission")?;
    let form = fetch_form(&pool, &id).await?;

    let submission = sqlx::query_as::<_, Submission>(
        r#"
        SELECT id, form_id, user_id, answers, submitted_at, ip_address, user_agent
        FROM submissions
        WHERE id = ? AND form_id = ?
        "#,
    )
    .bind(&submission_id)
    .bind(&form.id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    let is_owner = form.owner_id == user.id();
    let is_submitter = submission.user_id.as_deref() == Some(user.id());
    if !is_owner && !is_submitter {
        return Err(AppError::Forbidden(
            "Forbidden: You can only view your own submissions".to_string(),
        ));
    }

    let review = review_submission(&form, &submission);

    Ok(Json(ApiResponse::new(
        "Submission retrieved successfully",
        SubmissionDetail { submission, review },
    )))
}
