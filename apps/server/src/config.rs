//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, so a bare `patungan-api` starts a working dev instance.

use serde::{Deserialize, Serialize};
use std::env;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for signing session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Gemini API key for receipt extraction (feature disabled when unset)
    pub gemini_api_key: Option<String>,

    /// Gemini model used for receipt extraction
    pub gemini_model: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "patungan.db".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // Development fallback only; production deployments MUST
                // set this via environment variable
                "patungan-dev-secret-change-in-production".to_string()
            }),

            jwt_lifetime_secs: env::var("JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "604800".to_string()) // 7 days
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),

            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
        };

        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        Ok(config)
    }

    /// Whether receipt extraction is available.
    pub fn extraction_enabled(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only assert on fields no test environment is expected to override
        let config = ServerConfig {
            port: 8080,
            database_path: "patungan.db".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_lifetime_secs: 604800,
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
        };
        assert!(!config.extraction_enabled());
    }

    #[test]
    fn test_extraction_enabled_with_key() {
        let config = ServerConfig {
            port: 8080,
            database_path: "patungan.db".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_lifetime_secs: 604800,
            gemini_api_key: Some("key".to_string()),
            gemini_model: "gemini-2.5-flash".to_string(),
        };
        assert!(config.extraction_enabled());
    }
}
