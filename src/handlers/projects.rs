use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthAdmin;
use crate::database::{self, models::{Project, ProjectStatus}};
use crate::error::{ApiError, FieldError};

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub status: Option<String>,
    pub link: Option<String>,
}

/// Partial merge; absent fields keep their stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub status: Option<String>,
    pub link: Option<String>,
}

fn validate_status(status: &str) -> Result<(), ApiError> {
    if ProjectStatus::parse(status).is_none() {
        return Err(ApiError::validation(
            "Validation failed",
            vec![FieldError::new(
                "status",
                "Status must be one of: planned, in-progress, completed",
            )],
        ));
    }
    Ok(())
}

/// GET /api/projects - public listing, newest first
pub async fn list() -> Result<Json<Vec<Project>>, ApiError> {
    let pool = database::pool()?;
    let projects = sqlx::query_as("SELECT * FROM projects ORDER BY created_at DESC")
        .fetch_all(pool.as_ref())
        .await
        .map_err(database::DatabaseError::from)?;
    Ok(Json(projects))
}

/// GET /api/projects/:id
pub async fn get(Path(id): Path<Uuid>) -> Result<Json<Project>, ApiError> {
    let pool = database::pool()?;
    let project: Option<Project> = sqlx::query_as("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await
        .map_err(database::DatabaseError::from)?;
    project.map(Json).ok_or_else(|| ApiError::not_found("Project not found"))
}

/// POST /api/projects - admin only
pub async fn create(
    _admin: AuthAdmin,
    Json(payload): Json<CreateProject>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    if payload.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if payload.description.trim().is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }
    let status = payload.status.as_deref().unwrap_or(ProjectStatus::Planned.as_str());
    validate_status(status)?;

    let pool = database::pool()?;
    let project: Project = sqlx::query_as(
        r#"
        INSERT INTO projects (title, description, tags, tech_stack, status, link)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(payload.title.trim())
    .bind(payload.description.trim())
    .bind(&payload.tags)
    .bind(&payload.tech_stack)
    .bind(status)
    .bind(&payload.link)
    .fetch_one(pool.as_ref())
    .await
    .map_err(database::DatabaseError::from)?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/:id - admin only, partial merge. Unknown id is a 404.
pub async fn update(
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProject>,
) -> Result<Json<Project>, ApiError> {
    if let Some(status) = payload.status.as_deref() {
        validate_status(status)?;
    }

    let pool = database::pool()?;
    let project: Option<Project> = sqlx::query_as(
        r#"
        UPDATE projects SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            tags = COALESCE($4, tags),
            tech_stack = COALESCE($5, tech_stack),
            status = COALESCE($6, status),
            link = COALESCE($7, link),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.tags)
    .bind(&payload.tech_stack)
    .bind(&payload.status)
    .bind(&payload.link)
    .fetch_optional(pool.as_ref())
    .await
    .map_err(database::DatabaseError::from)?;

    project.map(Json).ok_or_else(|| ApiError::not_found("Project not found"))
}

/// DELETE /api/projects/:id - admin only. Unknown id is a 404.
pub async fn delete(
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool()?;
    let deleted: Option<(Uuid,)> = sqlx::query_as("DELETE FROM projects WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await
        .map_err(database::DatabaseError::from)?;

    match deleted {
        Some(_) => Ok(Json(json!({ "success": true, "message": "Project deleted" }))),
        None => Err(ApiError::not_found("Project not found")),
    }
}
