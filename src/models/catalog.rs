use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Which admin-managed list an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    LessonTypes,
    Memberships,
}

impl CatalogKind {
    pub fn collection_name(&self) -> &'static str {
        match self {
            CatalogKind::LessonTypes => "LessonTypes",
            CatalogKind::Memberships => "Memberships",
        }
    }
}

/// Named entry in "LessonTypes" or "Memberships"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(alias = "type")]
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCatalogEntryRequest {
    pub name: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CatalogEntryResponse {
    pub id: String,
    pub name: String,
}

impl From<CatalogEntry> for CatalogEntryResponse {
    fn from(e: CatalogEntry) -> Self {
        CatalogEntryResponse {
            id: e.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: e.name,
        }
    }
}
