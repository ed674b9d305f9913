// src/handlers/forms.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json as SqlJson};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        form::{Form, FormListParams, FormPayload, FormSummary},
        response::{ApiResponse, PageRequest},
    },
    utils::jwt::AuthUser,
    validation::validate_form_payload,
};

const SUMMARY_COLUMNS: &str = "SELECT id, title, description, header_image_url, owner_id, \
     json_array_length(questions) AS question_count, created_at, updated_at FROM forms";

/// Normalizes a path id, rejecting anything that is not a UUID.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<String, AppError> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID format", what)))
}

/// Loads a form or fails with 404.
pub(crate) async fn fetch_form(pool: &SqlitePool, id: &str) -> Result<Form, AppError> {
    sqlx::query_as::<_, Form>(
        r#"
        SELECT id, title, description, header_image_url, owner_id, questions, created_at, updated_at
        FROM forms
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch form {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or_else(|| AppError::NotFound("Form not found".to_string()))
}

/// Escapes LIKE wildcards so the search term matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters<'a>(
    builder: &mut QueryBuilder<'a, Sqlite>,
    owner_id: Option<&'a str>,
    search: Option<&'a str>,
) {
    builder.push(" WHERE 1 = 1");
    if let Some(owner_id) = owner_id {
        builder.push(" AND owner_id = ").push_bind(owner_id);
    }
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (title LIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR description LIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
}

/// Shared body of the public and the per-owner listing.
async fn list_summaries(
    pool: &SqlitePool,
    params: &FormListParams,
    owner_id: Option<&str>,
) -> Result<Json<ApiResponse<Vec<FormSummary>>>, AppError> {
    params.validate()?;
    let page = PageRequest::new(params.page, params.limit);
    let search = params.search.as_deref();

    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM forms");
    push_filters(&mut count_query, owner_id, search);
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count forms: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    let mut query = QueryBuilder::<Sqlite>::new(SUMMARY_COLUMNS);
    push_filters(&mut query, owner_id, search);
    query
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

    let forms: Vec<FormSummary> = query
        .build_query_as()
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list forms: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(ApiResponse::paginated(
        "Forms retrieved successfully",
        forms,
        page.pagination(total),
    )))
}

/// Runs both validation layers over a create/update body.
///
/// The structural check works on the raw JSON so every problem is reported
/// at once; only then is the body turned into a typed payload.
fn parse_payload(payload: Value) -> Result<FormPayload, AppError> {
    let report = validate_form_payload(&payload);
    if !report.valid {
        return Err(AppError::validation("Invalid form data", report.errors));
    }

    let payload = serde_json::from_value::<FormPayload>(payload)?.normalized();
    payload.validate()?;
    Ok(payload)
}

/// List all forms, newest first.
pub async fn list_forms(
    State(pool): State<SqlitePool>,
    Query(params): Query<FormListParams>,
) -> Result<impl IntoResponse, AppError> {
    list_summaries(&pool, &params, None).await
}

/// List the caller's own forms.
pub async fn my_forms(
    State(pool): State<SqlitePool>,
    user: AuthUser,
    Query(params): Query<FormListParams>,
) -> Result<impl IntoResponse, AppError> {
    list_summaries(&pool, &params, Some(user.id())).await
}

/// Create a form owned by the caller.
pub async fn create_form(
    State(pool): State<SqlitePool>,
    user: AuthUser,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_payload(payload)?;
    let now = chrono::Utc::now();

    let form = Form {
        id: Uuid::new_v4().to_string(),
        title: payload.title,
        description: payload.description.unwrap_or_default(),
        header_image_url: payload.header_image_url,
        owner_id: user.id().to_string(),
        questions: SqlJson(payload.questions),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO forms (id, title, description, header_image_url, owner_id, questions, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&form.id)
    .bind(&form.title)
    .bind(&form.description)
    .bind(&form.header_image_url)
    .bind(&form.owner_id)
    .bind(&form.questions)
    .bind(form.created_at)
    .bind(form.updated_at)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create form: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!("Form {} created by {}", form.id, form.owner_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Form created successfully", form)),
    ))
}

/// Get a single form with all its questions.
pub async fn get_form(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "form")?;
    let form = fetch_form(&pool, &id).await?;

    Ok(Json(ApiResponse::new("Form retrieved successfully", form)))
}

/// Replace a form. Only its owner may do this.
///
/// Fields left out of the body are reset rather than kept.
pub async fn update_form(
    State(pool): State<SqlitePool>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "form")?;
    let mut form = fetch_form(&pool, &id).await?;

    if form.owner_id != user.id() {
        tracing::warn!("User {} tried to update form {} owned by {}", user.id(), id, form.owner_id);
        return Err(AppError::Forbidden(
            "Forbidden: You can only update your own forms".to_string(),
        ));
    }

    let payload = parse_payload(payload)?;
    form.title = payload.title;
    form.description = payload.description.unwrap_or_default();
    form.header_image_url = payload.header_image_url;
    form.questions = SqlJson(payload.questions);
    form.updated_at = chrono::Utc::now();

    sqlx::query(
        r#"
        UPDATE forms
        SET title = ?, description = ?, header_image_url = ?, questions = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&form.title)
    .bind(&form.description)
    .bind(&form.header_image_url)
    .bind(&form.questions)
    .bind(form.updated_at)
    .bind(&form.id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update form {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!("Form {} updated", id);

    Ok(Json(ApiResponse::new("Form updated successfully", form)))
}

/// Delete a form together with its submissions.
pub async fn delete_form(
    State(pool): State<SqlitePool>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "form")?;
    let form = fetch_form(&pool, &id).await?;

    if form.owner_id != user.id() {
        return Err(AppError::Forbidden(
            "Forbidden: You can only delete your own forms".to_string(),
        ));
    }

    // Both deletes commit together or not at all.
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM submissions WHERE form_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM forms WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to delete form {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!("Form {} deleted with {} submissions", id, removed);

    Ok(Json(ApiResponse::new(
        "Form and associated submissions deleted successfully",
        json!({ "deletedFormId": id }),
    )))
}
