use async_trait::async_trait;
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Collection;
use serde::de::DeserializeOwned;

use super::{SeatChange, StudioStore};
use crate::database::{MongoDB, LESSONS, USERS};
use crate::models::{
    CatalogEntry, CatalogKind, Lesson, MembershipType, RegisteredLesson, UpdateUserRequest, User,
};
use crate::utils::AppError;

/// `StudioStore` backed by the MongoDB collections
#[derive(Clone)]
pub struct MongoStore {
    db: MongoDB,
}

impl MongoStore {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }

    fn lessons(&self) -> Collection<Lesson> {
        self.db.collection::<Lesson>(LESSONS)
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>(USERS)
    }

    fn catalog(&self, kind: CatalogKind) -> Collection<CatalogEntry> {
        self.db.collection::<CatalogEntry>(kind.collection_name())
    }
}

/// Lesson ids that are not valid ObjectIds can never match a document
fn parse_id(raw: &str) -> Option<ObjectId> {
    ObjectId::parse_str(raw).ok()
}

/// Reads every document, skipping (and logging) ones that no longer deserialize
async fn collect_all<T>(collection: &Collection<T>) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut cursor = collection.find(doc! {}).await?;
    let mut items = Vec::new();

    while let Some(result) = cursor.next().await {
        match result {
            Ok(item) => items.push(item),
            Err(e) => log::error!("❌ Skipping malformed document in {}: {}", collection.name(), e),
        }
    }

    Ok(items)
}

#[async_trait]
impl StudioStore for MongoStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.db.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn list_lessons(&self) -> Result<Vec<Lesson>, AppError> {
        collect_all(&self.lessons()).await
    }

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<Lesson>, AppError> {
        let Some(oid) = parse_id(lesson_id) else {
            return Ok(None);
        };
        Ok(self.lessons().find_one(doc! { "_id": oid }).await?)
    }

    async fn insert_lesson(&self, mut lesson: Lesson) -> Result<Lesson, AppError> {
        lesson.id = None;
        let result = self.lessons().insert_one(&lesson).await?;
        let oid = result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError("Inserted lesson has no ObjectId".to_string())
        })?;
        lesson.id = Some(oid);
        Ok(lesson)
    }

    async fn delete_lesson(&self, lesson_id: &str) -> Result<bool, AppError> {
        let Some(oid) = parse_id(lesson_id) else {
            return Ok(false);
        };
        let result = self.lessons().delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn clear_lessons(&self) -> Result<u64, AppError> {
        let result = self.lessons().delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn set_lesson_active(&self, lesson_id: &str, is_active: bool) -> Result<bool, AppError> {
        let Some(oid) = parse_id(lesson_id) else {
            return Ok(false);
        };
        let result = self
            .lessons()
            .update_one(doc! { "_id": oid }, doc! { "$set": { "isActive": is_active } })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn update_lesson_seat(
        &self,
        lesson_id: &str,
        phone: &str,
        change: SeatChange,
    ) -> Result<bool, AppError> {
        let Some(oid) = parse_id(lesson_id) else {
            return Ok(false);
        };
        let result = match change {
            SeatChange::Take => {
                // Only matches while the phone is not listed yet
                self.lessons()
                    .update_one(
                        doc! { "_id": oid, "waitingList": { "$ne": phone } },
                        doc! {
                            "$push": { "waitingList": phone },
                            "$inc": { "registeredParticipants": 1 }
                        },
                    )
                    .await?
            }
            SeatChange::Release => {
                // Pipeline update so the decrement can be floored at zero in one write
                let pipeline: Vec<Document> = vec![doc! {
                    "$set": {
                        "waitingList": {
                            "$filter": {
                                "input": { "$ifNull": ["$waitingList", []] },
                                "cond": { "$ne": ["$$this", phone] }
                            }
                        },
                        "registeredParticipants": {
                            "$max": [
                                { "$subtract": [{ "$toInt": { "$ifNull": ["$registeredParticipants", 0] } }, 1] },
                                0
                            ]
                        }
                    }
                }];
                self.lessons().update_one(doc! { "_id": oid }, pipeline).await?
            }
        };

        Ok(result.matched_count > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        collect_all(&self.users()).await
    }

    async fn get_user(&self, phone: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "_id": phone }).await?)
    }

    async fn put_user(&self, user: &User) -> Result<(), AppError> {
        self.users()
            .replace_one(doc! { "_id": &user.phone }, user)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn update_user(&self, phone: &str, update: &UpdateUserRequest) -> Result<bool, AppError> {
        let mut set_doc = Document::new();

        if let Some(name) = &update.name { set_doc.insert("name", name.trim()); }
        if let Some(is_admin) = update.is_admin { set_doc.insert("isAdmin", is_admin); }
        if let Some(membership) = &update.membership_type {
            set_doc.insert("membershipType", MembershipType::from(membership.as_str()).to_string());
        }
        if let Some(remaining) = update.remaining_lessons { set_doc.insert("remainingLessons", remaining as i64); }

        if set_doc.is_empty() {
            return Ok(self.get_user(phone).await?.is_some());
        }

        let result = self
            .users()
            .update_one(doc! { "_id": phone }, doc! { "$set": set_doc })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_user(&self, phone: &str) -> Result<bool, AppError> {
        let result = self.users().delete_one(doc! { "_id": phone }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn add_registered_lesson(
        &self,
        phone: &str,
        summary: &RegisteredLesson,
        consume_credit: bool,
    ) -> Result<bool, AppError> {
        let summary_doc = mongodb::bson::to_bson(summary)?;

        let (filter, update) = if consume_credit {
            (
                doc! { "_id": phone, "remainingLessons": { "$gt": 0 } },
                doc! {
                    "$push": { "registeredLessons": summary_doc },
                    "$inc": { "remainingLessons": -1 }
                },
            )
        } else {
            (
                doc! { "_id": phone },
                doc! { "$push": { "registeredLessons": summary_doc } },
            )
        };

        let result = self.users().update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn remove_registered_lesson(
        &self,
        phone: &str,
        lesson_id: &str,
        refund_credit: bool,
    ) -> Result<bool, AppError> {
        let pull = doc! { "$pull": { "registeredLessons": { "id": lesson_id } } };

        if refund_credit {
            // The credit goes back only together with a summary that is actually held
            let mut update = pull.clone();
            update.insert("$inc", doc! { "remainingLessons": 1 });
            let refunded = self
                .users()
                .update_one(doc! { "_id": phone, "registeredLessons.id": lesson_id }, update)
                .await?;
            if refunded.matched_count > 0 {
                return Ok(true);
            }
        }

        let result = self.users().update_one(doc! { "_id": phone }, pull).await?;
        Ok(result.matched_count > 0)
    }

    async fn list_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, AppError> {
        collect_all(&self.catalog(kind)).await
    }

    async fn add_catalog_entry(&self, kind: CatalogKind, name: &str) -> Result<CatalogEntry, AppError> {
        let mut entry = CatalogEntry { id: None, name: name.to_string() };
        let result = self.catalog(kind).insert_one(&entry).await?;
        entry.id = result.inserted_id.as_object_id();
        Ok(entry)
    }

    async fn delete_catalog_entry(&self, kind: CatalogKind, entry_id: &str) -> Result<bool, AppError> {
        let Some(oid) = parse_id(entry_id) else {
            return Ok(false);
        };
        let result = self.catalog(kind).delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }
}
