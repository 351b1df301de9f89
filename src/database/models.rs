use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// An administrator account.
///
/// The password hash is never serialized to the client.
#[derive(Debug, FromRow, Serialize)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planned,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(ProjectStatus::Planned),
            "in-progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, FromRow, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub tech_stack: Vec<String>,
    pub status: String,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Message left through the public contact form.
/// Status moves through {new, read, replied}; transitions are unconstrained.
#[derive(Debug, FromRow, Serialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub const CONTACT_MESSAGE_STATUSES: &[&str] = &["new", "read", "replied"];

/// The singleton contact-info record. Arbitrary fields live in `data`
/// and are flattened into the response body.
#[derive(Debug, FromRow, Serialize)]
pub struct ContactInfo {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct Writing {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_round_trips() {
        for s in ["planned", "in-progress", "completed"] {
            assert_eq!(ProjectStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(ProjectStatus::parse("shipped").is_none());
    }

    #[test]
    fn admin_never_serializes_hash() {
        let admin = Admin {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&admin).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@b.com");
    }
}
