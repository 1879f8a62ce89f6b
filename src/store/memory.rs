use super::{StoreError, StoreResult, StudentStore, UserStore};
use crate::models::{Student, StudentPatch, UpdateOutcome, User};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Process-local student collection, in insertion order.
#[derive(Default)]
pub struct MemoryStudentStore {
    students: RwLock<Vec<Student>>,
    unavailable: AtomicBool,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn insert(&self, mut student: Student) -> StoreResult<Student> {
        self.check()?;
        student.id = Some(ObjectId::new());
        self.students.write().await.push(student.clone());
        Ok(student)
    }

    async fn insert_many(&self, students: Vec<Student>) -> StoreResult<u64> {
        self.check()?;
        let mut guard = self.students.write().await;
        let inserted = students.len() as u64;
        guard.extend(students.into_iter().map(|mut s| {
            s.id = Some(ObjectId::new());
            s
        }));
        Ok(inserted)
    }

    async fn list(&self) -> StoreResult<Vec<Student>> {
        self.check()?;
        Ok(self.students.read().await.clone())
    }

    async fn update(&self, id: ObjectId, patch: &StudentPatch) -> StoreResult<UpdateOutcome> {
        self.check()?;
        let mut guard = self.students.write().await;
        let Some(student) = guard.iter_mut().find(|s| s.id == Some(id)) else {
            return Ok(UpdateOutcome { matched: 0, modified: 0 });
        };

        let before = student.clone();
        patch.apply_to(student);
        let modified = u64::from(*student != before);

        Ok(UpdateOutcome { matched: 1, modified })
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<u64> {
        self.check()?;
        let mut guard = self.students.write().await;
        let before = guard.len();
        guard.retain(|s| s.id != Some(id));
        Ok((before - guard.len()) as u64)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        self.check()?;
        let mut guard = self.students.write().await;
        let deleted = guard.len() as u64;
        guard.clear();
        Ok(deleted)
    }

    async fn count(&self) -> StoreResult<u64> {
        self.check()?;
        Ok(self.students.read().await.len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let guard = self.users.read().await;
        Ok(guard.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<User>> {
        let guard = self.users.read().await;
        Ok(guard.iter().find(|u| u.id == Some(id)).cloned())
    }

    async fn insert(&self, mut user: User) -> StoreResult<ObjectId> {
        let mut guard = self.users.write().await;
        if guard.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("users.username".to_string()));
        }

        let id = ObjectId::new();
        user.id = Some(id);
        guard.push(user);
        Ok(id)
    }
}
