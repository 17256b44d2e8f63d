//! Shared application state.
//!
//! One `AppState` is built at startup and cloned into every handler (all
//! members are cheap to clone or internally reference-counted).

use crate::auth::JwtManager;
use crate::config::ServerConfig;
use crate::extractor::ReceiptExtractor;
use patungan_db::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub jwt: JwtManager,
    /// Present only when a Gemini API key is configured.
    pub extractor: Option<ReceiptExtractor>,
}

impl AppState {
    /// Builds the state from loaded configuration and a connected database.
    pub fn new(config: ServerConfig, db: Database) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        let extractor = config
            .gemini_api_key
            .clone()
            .map(|key| ReceiptExtractor::new(key, config.gemini_model.clone()));

        AppState {
            db,
            config,
            jwt,
            extractor,
        }
    }

    /// The extractor, or a consistent error when the feature is off.
    pub fn extractor(&self) -> Result<&ReceiptExtractor, crate::error::ApiError> {
        self.extractor.as_ref().ok_or_else(|| {
            crate::error::ApiError::validation(
                "Receipt extraction is not configured on this server (missing GEMINI_API_KEY)",
            )
        })
    }
}
