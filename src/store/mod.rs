//! Document store seam.
//!
//! The services only ever talk to [`StudioStore`]: read-all, read-by-id,
//! whole-document writes and the field-level array updates the booking flow
//! needs. Two collections are touched independently, nothing here is
//! transactional.

pub mod memory_store;
pub mod mongo_store;

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{CatalogEntry, CatalogKind, Lesson, RegisteredLesson, UpdateUserRequest, User};
use crate::utils::AppError;

pub use memory_store::MemoryStore;
pub use mongo_store::MongoStore;

pub type SharedStore = Arc<dyn StudioStore>;

/// Field-level change to a lesson's registration state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatChange {
    /// Add the phone to `waitingList` and bump `registeredParticipants`.
    /// Does nothing when the phone is already listed.
    Take,
    /// Pull the phone and decrement `registeredParticipants`, floored at zero
    Release,
}

#[async_trait]
pub trait StudioStore: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    // ==================== LESSONS ====================

    async fn list_lessons(&self) -> Result<Vec<Lesson>, AppError>;

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<Lesson>, AppError>;

    /// Stores a new lesson and returns it with its generated id
    async fn insert_lesson(&self, lesson: Lesson) -> Result<Lesson, AppError>;

    async fn delete_lesson(&self, lesson_id: &str) -> Result<bool, AppError>;

    /// Returns the number of lessons removed
    async fn clear_lessons(&self) -> Result<u64, AppError>;

    async fn set_lesson_active(&self, lesson_id: &str, is_active: bool) -> Result<bool, AppError>;

    /// Returns false when nothing was written: the lesson does not exist, or
    /// a `Take` found the phone already listed
    async fn update_lesson_seat(
        &self,
        lesson_id: &str,
        phone: &str,
        change: SeatChange,
    ) -> Result<bool, AppError>;

    // ==================== USERS ====================

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    async fn get_user(&self, phone: &str) -> Result<Option<User>, AppError>;

    /// Creates or fully replaces the user document keyed by phone
    async fn put_user(&self, user: &User) -> Result<(), AppError>;

    async fn update_user(&self, phone: &str, update: &UpdateUserRequest) -> Result<bool, AppError>;

    async fn delete_user(&self, phone: &str) -> Result<bool, AppError>;

    /// Appends the summary to `registeredLessons`. With `consume_credit` the
    /// punch-card counter is decremented and the write only applies while
    /// credits remain. Returns false when nothing matched.
    async fn add_registered_lesson(
        &self,
        phone: &str,
        summary: &RegisteredLesson,
        consume_credit: bool,
    ) -> Result<bool, AppError>;

    /// Pulls the summary. With `refund_credit` one punch-card credit is given
    /// back, but only if a summary was actually removed. Returns false when
    /// the user does not exist.
    async fn remove_registered_lesson(
        &self,
        phone: &str,
        lesson_id: &str,
        refund_credit: bool,
    ) -> Result<bool, AppError>;

    // ==================== CATALOG ====================

    async fn list_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, AppError>;

    async fn add_catalog_entry(&self, kind: CatalogKind, name: &str) -> Result<CatalogEntry, AppError>;

    async fn delete_catalog_entry(&self, kind: CatalogKind, entry_id: &str) -> Result<bool, AppError>;
}
