use super::{StoreError, StoreResult, StudentStore, UserStore};
use crate::database::{MongoDB, STUDENTS_COLLECTION, USERS_COLLECTION};
use crate::models::{Student, StudentPatch, UpdateOutcome, User};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoStudentStore {
    collection: Collection<Student>,
}

impl MongoStudentStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection(STUDENTS_COLLECTION),
        }
    }
}

#[async_trait]
impl StudentStore for MongoStudentStore {
    async fn insert(&self, mut student: Student) -> StoreResult<Student> {
        student.id = None;
        let result = self.collection.insert_one(&student).await?;
        student.id = result.inserted_id.as_object_id();
        Ok(student)
    }

    async fn insert_many(&self, students: Vec<Student>) -> StoreResult<u64> {
        if students.is_empty() {
            return Ok(0);
        }
        let result = self.collection.insert_many(&students).await?;
        Ok(result.inserted_ids.len() as u64)
    }

    async fn list(&self) -> StoreResult<Vec<Student>> {
        let cursor = self
            .collection
            .clone_with_type::<Document>()
            .find(doc! {})
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(decode_students(documents))
    }

    async fn update(&self, id: ObjectId, patch: &StudentPatch) -> StoreResult<UpdateOutcome> {
        let filter = doc! { "_id": id };

        // `$set` with no fields is rejected by the server
        if patch.is_empty() {
            let matched = self.collection.count_documents(filter).await?;
            return Ok(UpdateOutcome { matched, modified: 0 });
        }

        let result = self
            .collection
            .update_one(filter, patch.to_set_document())
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<u64> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = self.collection.delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}

#[derive(Clone)]
pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "username": username })
            .await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn insert(&self, mut user: User) -> StoreResult<ObjectId> {
        user.id = None;
        let result = self.collection.insert_one(&user).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::Duplicate("users.username".to_string())
            } else {
                StoreError::Database(e)
            }
        })?;

        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id),
            other => Err(StoreError::UnexpectedId(other.to_string())),
        }
    }
}

/// Documents that do not decode as a student are skipped with a warning so
/// one bad record cannot hide the rest of the collection.
fn decode_students(documents: Vec<Document>) -> Vec<Student> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get("_id").cloned();
            match mongodb::bson::from_document::<Student>(document) {
                Ok(student) => Some(student),
                Err(e) => {
                    log::warn!("⚠️  Skipping malformed student {:?}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    #[test]
    fn test_decode_students_skips_malformed_documents() {
        let documents = vec![
            doc! { "_id": ObjectId::new(), "name": "Zed", "age": 20.0_f64, "grade": "A" },
            doc! { "_id": ObjectId::new(), "name": "No Age", "grade": "B" },
            doc! { "_id": ObjectId::new(), "name": "Ann", "age": 19_i64, "grade": "A-" },
        ];

        let students = decode_students(documents);
        let names: Vec<_> = students.iter().map(|s| (s.name.as_str(), s.age)).collect();
        assert_eq!(names, vec![("Zed", 20), ("Ann", 19)]);
    }

    async fn connect() -> MongoDB {
        dotenv::dotenv().ok();
        let mut config = DatabaseConfig::from_env().unwrap();
        config.name = format!("{}_test", config.name);
        MongoDB::new(&config).await.unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_student_round_trip() {
        let db = connect().await;
        let store = MongoStudentStore::new(&db);

        store.delete_all().await.unwrap();
        let created = store.insert(Student::new("Alice Johnson", 20, "A")).await.unwrap();
        let id = created.id.unwrap();

        let patch = StudentPatch {
            grade: Some("A+".into()),
            ..Default::default()
        };
        let outcome = store.update(id, &patch).await.unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

        assert_eq!(store.delete(id).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_duplicate_username_is_reported() {
        let db = connect().await;
        let store = MongoUserStore::new(&db);
        let username = format!("dup-{}", ObjectId::new().to_hex());

        let user = User {
            id: None,
            username: username.clone(),
            password: "hash".into(),
            created_at: mongodb::bson::DateTime::now(),
        };

        store.insert(user.clone()).await.unwrap();
        assert!(matches!(
            store.insert(user).await,
            Err(StoreError::Duplicate(_))
        ));
    }
}
