use crate::{
    models::{CatalogEntry, CatalogKind},
    store::StudioStore,
    utils::AppError,
};

pub async fn list_entries(store: &dyn StudioStore, kind: CatalogKind) -> Result<Vec<CatalogEntry>, AppError> {
    store.list_catalog(kind).await
}

pub async fn add_entry(
    store: &dyn StudioStore,
    kind: CatalogKind,
    name: &str,
) -> Result<CatalogEntry, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("Name is required".to_string()));
    }

    let entry = store.add_catalog_entry(kind, name).await?;
    log::info!("📚 Added '{}' to {}", entry.name, kind.collection_name());
    Ok(entry)
}

pub async fn delete_entry(store: &dyn StudioStore, kind: CatalogKind, entry_id: &str) -> Result<(), AppError> {
    if !store.delete_catalog_entry(kind, entry_id).await? {
        return Err(AppError::NotFound(format!(
            "Entry {} not found in {}",
            entry_id,
            kind.collection_name()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn names_are_trimmed_and_required() {
        let store = MemoryStore::new();

        let entry = add_entry(&store, CatalogKind::LessonTypes, "  Mat  ").await.unwrap();
        assert_eq!(entry.name, "Mat");

        let err = add_entry(&store, CatalogKind::LessonTypes, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(list_entries(&store, CatalogKind::LessonTypes).await.unwrap().len(), 1);
    }
}
