use crate::config::AppConfig;
use crate::models::{membership, CatalogKind, MembershipType, User};
use crate::store::StudioStore;
use crate::utils::{schedule_time, AppError};

/// Seeds the admin account and the default membership plans.
/// Existing data is left alone.
pub async fn seed_studio(store: &dyn StudioStore, config: &AppConfig) -> Result<(), AppError> {
    if store.get_user(&config.admin_phone).await?.is_none() {
        log::info!("👤 Seeding admin user {}", config.admin_phone);
        store
            .put_user(&User {
                phone: config.admin_phone.clone(),
                name: config.admin_name.clone(),
                is_admin: true,
                membership_type: MembershipType::default(),
                remaining_lessons: 0,
                registered_lessons: Vec::new(),
                completed_lessons: 0,
                join_date: Some(schedule_time::now_iso()),
            })
            .await?;
    }

    let plans = store.list_catalog(CatalogKind::Memberships).await?;
    if !plans.is_empty() {
        log::info!("📋 Memberships: {} plans already stored, skipping seed", plans.len());
        return Ok(());
    }

    for plan in membership::default_plans() {
        store.add_catalog_entry(CatalogKind::Memberships, plan).await?;
    }
    log::info!("   ✅ Inserted {} default membership plans", membership::default_plans().len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn seeding_twice_does_not_duplicate() {
        let store = MemoryStore::new();
        let config = AppConfig::default();

        seed_studio(&store, &config).await.unwrap();
        seed_studio(&store, &config).await.unwrap();

        let admin = store.get_user(&config.admin_phone).await.unwrap().unwrap();
        assert!(admin.is_admin);
        assert_eq!(
            store.list_catalog(CatalogKind::Memberships).await.unwrap().len(),
            membership::default_plans().len()
        );
    }
}
