use std::sync::Arc;

use sqlx::PgPool;
use tower_sessions::MemoryStore;

use scolaris_config::{
    CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, SessionConfig, StorageConfig,
};
use scolaris_core::file_storage::{FileStorage, LocalFileStorage};
use scolaris_db::{DbInitError, init_db_pool};

use crate::utils::email::EmailService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub storage_config: StorageConfig,
    pub storage: Arc<dyn FileStorage>,
    pub session_config: SessionConfig,
    /// Cookie sessions live in process memory and end with the server.
    pub session_store: MemoryStore,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("jwt_config", &"<redacted>")
            .field("email_config", &self.email_config.smtp_host)
            .field("cors_config", &self.cors_config)
            .field("rate_limit_config", &self.rate_limit_config)
            .field("storage_config", &self.storage_config)
            .field("session_config", &self.session_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        db: PgPool,
        jwt_config: JwtConfig,
        email_config: EmailConfig,
        cors_config: CorsConfig,
        rate_limit_config: RateLimitConfig,
        storage_config: StorageConfig,
        session_config: SessionConfig,
    ) -> Self {
        let storage = LocalFileStorage::new(
            storage_config.upload_dir.clone(),
            storage_config.base_url.clone(),
            storage_config.max_upload_bytes,
        );

        Self {
            db,
            jwt_config,
            email_config,
            cors_config,
            rate_limit_config,
            storage_config,
            storage: Arc::new(storage),
            session_config,
            session_store: MemoryStore::default(),
        }
    }

    pub fn email(&self) -> EmailService {
        EmailService::new(self.email_config.clone())
    }
}

pub async fn init_app_state() -> Result<AppState, DbInitError> {
    Ok(AppState::new(
        init_db_pool().await?,
        JwtConfig::from_env(),
        EmailConfig::from_env(),
        CorsConfig::from_env(),
        RateLimitConfig::from_env(),
        StorageConfig::from_env(),
        SessionConfig::from_env(),
    ))
}

#[cfg(any(test, feature = "test-utils"))]
impl AppState {
    /// Rate limiting off, mail logged, uploads in a fresh temporary directory.
    pub fn for_tests(db: PgPool) -> Self {
        let storage_config = StorageConfig {
            upload_dir: std::env::temp_dir().join(format!("scolaris-test-{}", uuid::Uuid::new_v4())),
            ..StorageConfig::default()
        };

        Self::new(
            db,
            JwtConfig::from_env(),
            EmailConfig::default(),
            CorsConfig::default(),
            RateLimitConfig::disabled(),
            storage_config,
            SessionConfig::default(),
        )
    }
}
