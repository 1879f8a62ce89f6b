use crate::config::DatabaseConfig;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

pub const STUDENTS_COLLECTION: &str = "students";
pub const USERS_COLLECTION: &str = "users";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(&config.uri).await?;

        client_options.app_name = Some("school-service".to_string());
        client_options.max_pool_size = Some(10);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.name);

        // Fail fast if the deployment is unreachable
        db.run_command(doc! { "ping": 1 }).await?;
        log::info!("🏓 Pinged deployment, connected to database '{}'", config.name);

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique `users.username`, backing the duplicate-registration check.
    async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let users = self.collection::<Document>(USERS_COLLECTION);

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        users.create_index(username_index).await?;
        log::info!("   ✅ Index ready: users(username) unique");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Closes the pool; used by the one-shot scripts before exiting.
    pub async fn shutdown(self) {
        let Self { client, db } = self;
        drop(db);
        client.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let config = DatabaseConfig::from_env().unwrap();
        let db = MongoDB::new(&config).await;
        assert!(db.is_ok());
    }
}
