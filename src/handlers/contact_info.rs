use axum::{extract::Path, response::IntoResponse, Json};
use serde_json::{Map, Value};

use crate::auth::AuthAdmin;
use crate::database::{self, models::ContactInfo};
use crate::error::{ApiError, FieldError};

/// GET /api/contact-info - public.
///
/// "Not configured yet" is a normal state, not a failure: the response is
/// a 200 with JSON null rather than a 404.
pub async fn get() -> Result<Json<Option<ContactInfo>>, ApiError> {
    let pool = database::pool()?;
    let info: Option<ContactInfo> =
        sqlx::query_as("SELECT id, data, updated_at FROM contact_info LIMIT 1")
            .fetch_optional(pool.as_ref())
            .await
            .map_err(database::DatabaseError::from)?;
    Ok(Json(info))
}

/// POST/PUT /api/contact-info - admin only, singleton upsert.
///
/// The insert targets the partial-unique `singleton` key, so concurrent
/// writers collapse into one row: update-if-present, insert-if-absent,
/// atomically in the store. Repeated posts replace the stored fields
/// wholesale with the latest payload.
pub async fn upsert(
    _admin: AuthAdmin,
    Json(payload): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::validation(
            "Validation failed",
            vec![FieldError::new("body", "At least one contact field is required")],
        ));
    }

    let pool = database::pool()?;
    let info: ContactInfo = sqlx::query_as(
        r#"
        INSERT INTO contact_info (singleton, data) VALUES (TRUE, $1)
        ON CONFLICT (singleton) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
        RETURNING id, data, updated_at
        "#,
    )
    .bind(Value::Object(payload))
    .fetch_one(pool.as_ref())
    .await
    .map_err(database::DatabaseError::from)?;

    Ok(Json(info))
}

/// POST/PUT /api/contact-info/:id - the id is accepted for URL
/// compatibility but ignored; there is only one logical record.
pub async fn upsert_by_id(
    admin: AuthAdmin,
    Path(_id): Path<String>,
    payload: Json<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    upsert(admin, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn upsert_rejects_empty_body() {
        let token = crate::auth::generate_token(crate::auth::Claims::new(
            uuid::Uuid::new_v4(),
            "admin@test.com".to_string(),
        ))
        .unwrap();
        let app = Router::new().route("/api/contact-info", post(upsert));
        let req = Request::post("/api/contact-info")
            .header("content-type", "application/json")
            .header("cookie", format!("token={}", token))
            .body(Body::from("{}"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upsert_without_session_is_unauthorized() {
        let app = Router::new().route("/api/contact-info", post(upsert));
        let req = Request::post("/api/contact-info")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"email":"me@example.com"}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn arbitrary_fields_flatten_into_response() {
        let info = ContactInfo {
            id: uuid::Uuid::new_v4(),
            data: serde_json::json!({ "email": "me@example.com", "github": "me" }),
            updated_at: chrono::Utc::now(),
        };
        let body = serde_json::to_value(&info).unwrap();
        assert_eq!(body["email"], "me@example.com");
        assert_eq!(body["github"], "me");
        assert!(body.get("data").is_none());
    }
}
