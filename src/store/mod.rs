//! Document-store access behind async traits, so handlers can run against
//! MongoDB in production and an in-memory backend in tests.

pub mod memory;
pub mod mongo;

use crate::models::{Student, StudentPatch, UpdateOutcome, User};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

pub use memory::{MemoryStudentStore, MemoryUserStore};
pub use mongo::{MongoStudentStore, MongoUserStore};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] mongodb::error::Error),

    #[error("duplicate key on {0}")]
    Duplicate(String),

    #[error("unexpected inserted id: {0}")]
    UnexpectedId(String),

    #[error("document store is unavailable")]
    Unavailable,
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Inserts one student and returns it with its generated `_id`.
    async fn insert(&self, student: Student) -> StoreResult<Student>;

    async fn insert_many(&self, students: Vec<Student>) -> StoreResult<u64>;

    async fn list(&self) -> StoreResult<Vec<Student>>;

    async fn update(&self, id: ObjectId, patch: &StudentPatch) -> StoreResult<UpdateOutcome>;

    /// Returns the number of deleted documents (0 or 1).
    async fn delete(&self, id: ObjectId) -> StoreResult<u64>;

    async fn delete_all(&self) -> StoreResult<u64>;

    async fn count(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<User>>;

    /// Fails with `StoreError::Duplicate` when the username is taken.
    async fn insert(&self, user: User) -> StoreResult<ObjectId>;
}
