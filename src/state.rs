use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    config::{AppConfig, AuthConfig, StoreBackend},
    database::MongoDB,
    services::auth_service::AuthSettings,
    store::{
        MemoryStudentStore, MemoryUserStore, MongoStudentStore, MongoUserStore, StudentStore,
        UserStore,
    },
};

/// Shared handler context, built once at startup and cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentStore>,
    pub users: Arc<dyn UserStore>,
    pub auth: AuthSettings,
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(
        students: Arc<dyn StudentStore>,
        users: Arc<dyn UserStore>,
        auth: &AuthConfig,
        public_dir: PathBuf,
    ) -> Self {
        Self {
            students,
            users,
            auth: AuthSettings::from(auth),
            public_dir,
        }
    }

    pub fn with_mongodb(db: &MongoDB, config: &AppConfig) -> Self {
        Self::new(
            Arc::new(MongoStudentStore::new(db)),
            Arc::new(MongoUserStore::new(db)),
            &config.auth,
            config.public_dir.clone(),
        )
    }

    pub fn in_memory(auth: &AuthConfig, public_dir: PathBuf) -> Self {
        Self::new(
            Arc::new(MemoryStudentStore::new()),
            Arc::new(MemoryUserStore::new()),
            auth,
            public_dir,
        )
    }

    /// Builds the state for the configured backend, connecting to MongoDB if needed.
    pub async fn from_config(config: &AppConfig) -> Result<Self, mongodb::error::Error> {
        match (config.backend, &config.database) {
            (StoreBackend::MongoDB, Some(db_config)) => {
                let db = MongoDB::new(db_config).await?;
                log::info!("✅ MongoDB connected successfully");
                Ok(Self::with_mongodb(&db, config))
            }
            _ => {
                log::warn!("⚠️  Using the in-memory store, data is lost on restart");
                Ok(Self::in_memory(&config.auth, config.public_dir.clone()))
            }
        }
    }
}
