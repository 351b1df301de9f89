use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthAdmin;
use crate::database::{self, models::Writing};
use crate::error::{ApiError, FieldError};

#[derive(Debug, Deserialize)]
pub struct CreateWriting {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published: bool,
}

/// Partial merge; absent fields keep their stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateWriting {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

/// Slugs are lowercase alphanumerics and hyphens, no leading/trailing or
/// doubled hyphen.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
}

fn slug_field_error() -> FieldError {
    FieldError::new("slug", "Slug must be lowercase letters, digits, and single hyphens")
}

// Admin mutations share the public slug route, so the id arrives as a raw
// path segment and is parsed here to keep the 400 in the JSON wire shape.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid writing id"))
}

/// GET /api/writings - public listing: published only, newest first
pub async fn list_published() -> Result<Json<Vec<Writing>>, ApiError> {
    let pool = database::pool()?;
    let writings =
        sqlx::query_as("SELECT * FROM writings WHERE published ORDER BY created_at DESC")
            .fetch_all(pool.as_ref())
            .await
            .map_err(database::DatabaseError::from)?;
    Ok(Json(writings))
}

/// GET /api/writings/:slug - public single fetch.
///
/// Unpublished drafts are indistinguishable from absent records: both 404.
pub async fn get_published(Path(slug): Path<String>) -> Result<Json<Writing>, ApiError> {
    let pool = database::pool()?;
    let writing: Option<Writing> =
        sqlx::query_as("SELECT * FROM writings WHERE slug = $1 AND published")
            .bind(&slug)
            .fetch_optional(pool.as_ref())
            .await
            .map_err(database::DatabaseError::from)?;
    writing.map(Json).ok_or_else(|| ApiError::not_found("Writing not found"))
}

/// GET /api/writings/admin/all - drafts included, newest first
pub async fn list_all(_admin: AuthAdmin) -> Result<Json<Vec<Writing>>, ApiError> {
    let pool = database::pool()?;
    let writings = sqlx::query_as("SELECT * FROM writings ORDER BY created_at DESC")
        .fetch_all(pool.as_ref())
        .await
        .map_err(database::DatabaseError::from)?;
    Ok(Json(writings))
}

/// POST /api/writings - admin only
pub async fn create(
    _admin: AuthAdmin,
    Json(payload): Json<CreateWriting>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    if payload.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if !is_valid_slug(&payload.slug) {
        errors.push(slug_field_error());
    }
    if payload.content.trim().is_empty() {
        errors.push(FieldError::new("content", "Content is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }

    let pool = database::pool()?;
    let row: Result<Writing, sqlx::Error> = sqlx::query_as(
        r#"
        INSERT INTO writings (title, slug, content, published)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.slug)
    .bind(&payload.content)
    .bind(payload.published)
    .fetch_one(pool.as_ref())
    .await;

    match row {
        Ok(writing) => Ok((StatusCode::CREATED, Json(writing))),
        Err(e) if database::is_unique_violation(&e) => Err(ApiError::validation(
            "Validation failed",
            vec![FieldError::new("slug", "Slug already in use")],
        )),
        Err(e) => Err(database::DatabaseError::from(e).into()),
    }
}

/// PUT /api/writings/:id - admin only, partial merge. Unknown id is a 404.
pub async fn update(
    _admin: AuthAdmin,
    Path(raw_id): Path<String>,
    Json(payload): Json<UpdateWriting>,
) -> Result<Json<Writing>, ApiError> {
    let id = parse_id(&raw_id)?;
    if let Some(slug) = payload.slug.as_deref() {
        if !is_valid_slug(slug) {
            return Err(ApiError::validation("Validation failed", vec![slug_field_error()]));
        }
    }

    let pool = database::pool()?;
    let row: Result<Option<Writing>, sqlx::Error> = sqlx::query_as(
        r#"
        UPDATE writings SET
            title = COALESCE($2, title),
            slug = COALESCE($3, slug),
            content = COALESCE($4, content),
            published = COALESCE($5, published),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&payload.title)
    .bind(&payload.slug)
    .bind(&payload.content)
    .bind(payload.published)
    .fetch_optional(pool.as_ref())
    .await;

    match row {
        Ok(Some(writing)) => Ok(Json(writing)),
        Ok(None) => Err(ApiError::not_found("Writing not found")),
        Err(e) if database::is_unique_violation(&e) => Err(ApiError::validation(
            "Validation failed",
            vec![FieldError::new("slug", "Slug already in use")],
        )),
        Err(e) => Err(database::DatabaseError::from(e).into()),
    }
}

/// DELETE /api/writings/:id - admin only. Unknown id is a 404.
pub async fn delete(
    _admin: AuthAdmin,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id)?;
    let pool = database::pool()?;
    let deleted: Option<(Uuid,)> =
        sqlx::query_as("DELETE FROM writings WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool.as_ref())
            .await
            .map_err(database::DatabaseError::from)?;

    match deleted {
        Some(_) => Ok(Json(json!({ "success": true, "message": "Writing deleted" }))),
        None => Err(ApiError::not_found("Writing not found")),
    }
}
