use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub mail: MailConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub session_cookie_name: String,
    pub session_expiry_days: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// HTTP endpoint of the outbound mail relay. None disables relaying.
    pub relay_url: Option<String>,
    pub relay_token: Option<String>,
    pub from_address: String,
    pub contact_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// HTTP endpoint of the feature-extraction backend. None disables the adapter.
    pub inference_url: Option<String>,
    pub dimension: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment-specific defaults first, then specific env vars on top
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.server.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_IDLE_TIMEOUT_SECS") {
            self.database.idle_timeout_secs = v.parse().unwrap_or(self.database.idle_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.security.session_cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_DAYS") {
            self.security.session_expiry_days = v.parse().unwrap_or(self.security.session_expiry_days);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        // Mail overrides
        if let Ok(v) = env::var("MAIL_RELAY_URL") {
            self.mail.relay_url = Some(v);
        }
        if let Ok(v) = env::var("MAIL_RELAY_TOKEN") {
            self.mail.relay_token = Some(v);
        }
        if let Ok(v) = env::var("MAIL_FROM_ADDRESS") {
            self.mail.from_address = v;
        }
        if let Ok(v) = env::var("MAIL_CONTACT_ADDRESS") {
            self.mail.contact_address = v;
        }

        // Embedding overrides
        if let Ok(v) = env::var("EMBEDDING_INFERENCE_URL") {
            self.embedding.inference_url = Some(v);
        }
        if let Ok(v) = env::var("EMBEDDING_DIMENSION") {
            self.embedding.dimension = v.parse().unwrap_or(self.embedding.dimension);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            database: DatabaseConfig {
                max_connections: 10,
                acquire_timeout_secs: 3,
                idle_timeout_secs: 300,
            },
            security: SecurityConfig {
                jwt_secret: "dev-only-secret-change-in-production".to_string(),
                session_cookie_name: "token".to_string(),
                session_expiry_days: 7,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            mail: MailConfig {
                relay_url: None,
                relay_token: None,
                from_address: "noreply@localhost".to_string(),
                contact_address: "admin@localhost".to_string(),
            },
            embedding: EmbeddingConfig {
                inference_url: None,
                dimension: 384,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                cors_origins: vec!["https://staging.example.com".to_string()],
                max_request_size_bytes: 2 * 1024 * 1024,
            },
            database: DatabaseConfig {
                max_connections: 20,
                acquire_timeout_secs: 5,
                idle_timeout_secs: 300,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                session_cookie_name: "token".to_string(),
                session_expiry_days: 7,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            mail: MailConfig {
                relay_url: None,
                relay_token: None,
                from_address: "noreply@staging.example.com".to_string(),
                contact_address: "admin@staging.example.com".to_string(),
            },
            embedding: EmbeddingConfig {
                inference_url: None,
                dimension: 384,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                cors_origins: vec!["https://example.com".to_string()],
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            database: DatabaseConfig {
                max_connections: 50,
                acquire_timeout_secs: 5,
                idle_timeout_secs: 600,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                session_cookie_name: "token".to_string(),
                session_expiry_days: 7,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            mail: MailConfig {
                relay_url: None,
                relay_token: None,
                from_address: "noreply@example.com".to_string(),
                contact_address: "admin@example.com".to_string(),
            },
            embedding: EmbeddingConfig {
                inference_url: None,
                dimension: 384,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.security.session_cookie_name, "token");
        assert_eq!(config.security.session_expiry_days, 7);
        assert!(config.mail.relay_url.is_none());
    }

    #[test]
    fn production_requires_external_secret() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.embedding.dimension, 384);
    }
}
