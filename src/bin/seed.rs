//! Replaces the `students` collection with the sample data set.

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

    let result = seed(&MongoStudentStore::new(&db)).await;

    db.shutdown().await;
    log::info!("🔌 Database connection closed");

    result
}

async fn seed(store: &dyn StudentStore) -> Result<(), Box<dyn Error>> {
    let existing = store.count().await?;
    log::info!("Found {} existing students", existing);

    if existing > 0 {
        log::info!("🗑️  Clearing existing students before seeding...");
    }

    let response = student_service::seed(store).await?;
    log::info!("✅ Successfully seeded {} students!", response.inserted_count);

    println!("\n📚 Sample students added:");
    for (index, student) in student_service::sample_students().iter().enumerate() {
        println!(
            "{}. {} (Age: {}, Grade: {})",
            index + 1,
            student.name,
            student.age,
            student.grade
        );
    }

    Ok(())
}
