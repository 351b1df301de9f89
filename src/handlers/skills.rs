use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthAdmin;
use crate::database::{self, models::Skill};
use crate::error::{ApiError, FieldError};

#[derive(Debug, Deserialize)]
pub struct SkillPayload {
    #[serde(default)]
    pub name: String,
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation(
            "Validation failed",
            vec![FieldError::new("name", "Name is required")],
        ));
    }
    Ok(())
}

/// GET /api/skills - public listing
pub async fn list() -> Result<Json<Vec<Skill>>, ApiError> {
    let pool = database::pool()?;
    let skills = sqlx::query_as("SELECT * FROM skills ORDER BY created_at DESC")
        .fetch_all(pool.as_ref())
        .await
        .map_err(database::DatabaseError::from)?;
    Ok(Json(skills))
}

/// POST /api/skills - admin only
pub async fn create(
    _admin: AuthAdmin,
    Json(payload): Json<SkillPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name(&payload.name)?;

    let pool = database::pool()?;
    let skill: Skill = sqlx::query_as("INSERT INTO skills (name) VALUES ($1) RETURNING *")
        .bind(payload.name.trim())
        .fetch_one(pool.as_ref())
        .await
        .map_err(database::DatabaseError::from)?;

    Ok((StatusCode::CREATED, Json(skill)))
}

/// PUT /api/skills/:id - admin only. Unknown id is a 404.
pub async fn update(
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<SkillPayload>,
) -> Result<Json<Skill>, ApiError> {
    validate_name(&payload.name)?;

    let pool = database::pool()?;
    let skill: Option<Skill> =
        sqlx::query_as("UPDATE skills SET name = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(payload.name.trim())
            .fetch_optional(pool.as_ref())
            .await
            .map_err(database::DatabaseError::from)?;

    skill.map(Json).ok_or_else(|| ApiError::not_found("Skill not found"))
}

/// DELETE /api/skills/:id - admin only. Unknown id is a 404.
pub async fn delete(
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool()?;
    let deleted: Option<(Uuid,)> = sqlx::query_as("DELETE FROM skills WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await
        .map_err(database::DatabaseError::from)?;

    match deleted {
        Some(_) => Ok(Json(json!({ "success": true, "message": "Skill deleted" }))),
        None => Err(ApiError::not_found("Skill not found")),
    }
}
