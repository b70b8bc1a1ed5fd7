use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{SeatChange, StudioStore};
use crate::models::{
    CatalogEntry, CatalogKind, Lesson, MembershipType, RegisteredLesson, UpdateUserRequest, User,
};
use crate::utils::AppError;

#[derive(Default)]
struct MemoryState {
    lessons: BTreeMap<String, Lesson>,
    users: BTreeMap<String, User>,
    catalog: HashMap<CatalogKind, Vec<CatalogEntry>>,
}

/// Process-local store with the same update semantics as the MongoDB one.
/// Used for local demos (`STORE_BACKEND=memory`) and the test suite.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    #[cfg(test)]
    fail_user_writes: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every user-side booking write fail, to exercise partial updates
    #[cfg(test)]
    pub fn fail_user_writes(&self, fail: bool) {
        self.fail_user_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[cfg(test)]
    fn check_user_write(&self) -> Result<(), AppError> {
        if self.fail_user_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AppError::DatabaseError("injected user write failure".to_string()));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_user_write(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl StudioStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_lessons(&self) -> Result<Vec<Lesson>, AppError> {
        Ok(self.state.read().await.lessons.values().cloned().collect())
    }

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<Lesson>, AppError> {
        Ok(self.state.read().await.lessons.get(lesson_id).cloned())
    }

    async fn insert_lesson(&self, mut lesson: Lesson) -> Result<Lesson, AppError> {
        let id = ObjectId::new();
        lesson.id = Some(id);
        self.state
            .write()
            .await
            .lessons
            .insert(id.to_hex(), lesson.clone());
        Ok(lesson)
    }

    async fn delete_lesson(&self, lesson_id: &str) -> Result<bool, AppError> {
        Ok(self.state.write().await.lessons.remove(lesson_id).is_some())
    }

    async fn clear_lessons(&self) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let removed = state.lessons.len() as u64;
        state.lessons.clear();
        Ok(removed)
    }

    async fn set_lesson_active(&self, lesson_id: &str, is_active: bool) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        match state.lessons.get_mut(lesson_id) {
            Some(lesson) => {
                lesson.is_active = is_active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_lesson_seat(
        &self,
        lesson_id: &str,
        phone: &str,
        change: SeatChange,
    ) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let Some(lesson) = state.lessons.get_mut(lesson_id) else {
            return Ok(false);
        };

        match change {
            SeatChange::Take => {
                if lesson.has_participant(phone) {
                    return Ok(false);
                }
                lesson.waiting_list.push(phone.to_string());
                lesson.registered_participants += 1;
            }
            SeatChange::Release => {
                lesson.waiting_list.retain(|p| p != phone);
                lesson.registered_participants = lesson.registered_participants.saturating_sub(1);
            }
        }
        Ok(true)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn get_user(&self, phone: &str) -> Result<Option<User>, AppError> {
        Ok(self.state.read().await.users.get(phone).cloned())
    }

    async fn put_user(&self, user: &User) -> Result<(), AppError> {
        self.state
            .write()
            .await
            .users
            .insert(user.phone.clone(), user.clone());
        Ok(())
    }

    async fn update_user(&self, phone: &str, update: &UpdateUserRequest) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(phone) else {
            return Ok(false);
        };

        if let Some(name) = &update.name { user.name = name.trim().to_string(); }
        if let Some(is_admin) = update.is_admin { user.is_admin = is_admin; }
        if let Some(membership) = &update.membership_type {
            user.membership_type = MembershipType::from(membership.as_str());
        }
        if let Some(remaining) = update.remaining_lessons { user.remaining_lessons = remaining; }

        Ok(true)
    }

    async fn delete_user(&self, phone: &str) -> Result<bool, AppError> {
        Ok(self.state.write().await.users.remove(phone).is_some())
    }

    async fn add_registered_lesson(
        &self,
        phone: &str,
        summary: &RegisteredLesson,
        consume_credit: bool,
    ) -> Result<bool, AppError> {
        self.check_user_write()?;

        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(phone) else {
            return Ok(false);
        };

        if consume_credit {
            if user.remaining_lessons == 0 {
                return Ok(false);
            }
            user.remaining_lessons -= 1;
        }
        user.registered_lessons.push(summary.clone());
        Ok(true)
    }

    async fn remove_registered_lesson(
        &self,
        phone: &str,
        lesson_id: &str,
        refund_credit: bool,
    ) -> Result<bool, AppError> {
        self.check_user_write()?;

        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(phone) else {
            return Ok(false);
        };

        let before = user.registered_lessons.len();
        user.registered_lessons.retain(|l| l.id != lesson_id);
        if refund_credit && user.registered_lessons.len() < before {
            user.remaining_lessons += 1;
        }
        Ok(true)
    }

    async fn list_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .catalog
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_catalog_entry(&self, kind: CatalogKind, name: &str) -> Result<CatalogEntry, AppError> {
        let entry = CatalogEntry { id: Some(ObjectId::new()), name: name.to_string() };
        self.state
            .write()
            .await
            .catalog
            .entry(kind)
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn delete_catalog_entry(&self, kind: CatalogKind, entry_id: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let Some(entries) = state.catalog.get_mut(&kind) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|e| e.id.map(|id| id.to_hex()).as_deref() != Some(entry_id));
        Ok(entries.len() < before)
    }
}
