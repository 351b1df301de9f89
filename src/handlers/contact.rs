use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{is_valid_email, AuthAdmin};
use crate::database::{self, models::{ContactMessage, CONTACT_MESSAGE_STATUSES}};
use crate::error::{ApiError, FieldError};
use crate::mailer;

const DEFAULT_SUBJECT: &str = "General Inquiry";

#[derive(Debug, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: String,
}

/// POST /api/contact - public submission.
///
/// Persists the message with status `new`, then relays it to the outbound
/// mail relay when one is configured. Relay failure after a successful
/// write is a 500; the stored message is kept either way.
pub async fn submit(Json(payload): Json<ContactSubmission>) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "Invalid email format"));
    }
    if payload.message.trim().is_empty() {
        errors.push(FieldError::new("message", "Message is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }

    let subject = payload
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUBJECT);

    let pool = database::pool()?;
    let message: ContactMessage = sqlx::query_as(
        r#"
        INSERT INTO contact_messages (name, email, subject, message)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.email)
    .bind(subject)
    .bind(payload.message.trim())
    .fetch_one(pool.as_ref())
    .await
    .map_err(database::DatabaseError::from)?;

    mailer::relay_contact_message(&message).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Message sent", "id": message.id })),
    ))
}

/// GET /api/contact/messages - admin only, newest first
pub async fn list(_admin: AuthAdmin) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    let pool = database::pool()?;
    let messages = sqlx::query_as("SELECT * FROM contact_messages ORDER BY created_at DESC")
        .fetch_all(pool.as_ref())
        .await
        .map_err(database::DatabaseError::from)?;
    Ok(Json(messages))
}

/// PUT /api/contact/messages/:id - admin only, status transition.
/// Unknown id is a 404.
pub async fn update_status(
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<ContactMessage>, ApiError> {
    if !CONTACT_MESSAGE_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::validation(
            "Validation failed",
            vec![FieldError::new("status", "Status must be one of: new, read, replied")],
        ));
    }

    let pool = database::pool()?;
    let message: Option<ContactMessage> =
        sqlx::query_as("UPDATE contact_messages SET status = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(&payload.status)
            .fetch_optional(pool.as_ref())
            .await
            .map_err(database::DatabaseError::from)?;

    message.map(Json).ok_or_else(|| ApiError::not_found("Contact message not found"))
}
