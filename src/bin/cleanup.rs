//! Deletes every document in the `students` collection.

use dotenv::dotenv;
use school_service::{
    config::DatabaseConfig,
    database::MongoDB,
    services::student_service,
    store::{MongoStudentStore, StudentStore},
};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    school_service::init_logging();

    let config = DatabaseConfig::from_env()?;
    let db = MongoDB::new(&config).await?;
    log::info!("Connected to MongoDB!");

    let result = cleanup(&MongoStudentStore::new(&db)).await;

    db.shutdown().await;
    log::info!("🔌 Database connection closed");

    result
}

async fn cleanup(store: &dyn StudentStore) -> Result<(), Box<dyn Error>> {
    let existing = store.count().await?;
    log::info!("Found {} students in the database", existing);

    if existing == 0 {
        log::info!("🤷 No students found. Database is already clean!");
        return Ok(());
    }

    let response = student_service::cleanup(store).await?;
    log::info!("🗑️  Successfully deleted {} students!", response.deleted_count);

    let remaining = store.count().await?;
    log::info!("📊 Students remaining: {}", remaining);

    if remaining == 0 {
        log::info!("✅ Database cleanup completed successfully!");
        log::info!("💡 Tip: run the `seed` binary to add sample students back");
    }

    Ok(())
}
