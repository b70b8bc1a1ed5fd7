use crate::{
    models::{CreateUserRequest, MembershipType, UpdateUserRequest, User},
    services::auth_service::{is_valid_phone, normalize_phone},
    store::StudioStore,
    utils::{schedule_time, AppError},
};

pub async fn list_users(store: &dyn StudioStore) -> Result<Vec<User>, AppError> {
    let mut users = store.list_users().await?;
    users.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(users)
}

pub async fn get_user(store: &dyn StudioStore, phone: &str) -> Result<User, AppError> {
    store
        .get_user(phone)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", phone)))
}

pub async fn create_user(store: &dyn StudioStore, request: CreateUserRequest) -> Result<User, AppError> {
    let phone = normalize_phone(&request.phone);
    if !is_valid_phone(&phone) {
        return Err(AppError::InvalidRequest(format!("Invalid phone number: {}", request.phone)));
    }

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("Name is required".to_string()));
    }

    if store.get_user(&phone).await?.is_some() {
        return Err(AppError::InvalidRequest(format!("User {} already exists", phone)));
    }

    let membership_type = request
        .membership_type
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(MembershipType::from)
        .unwrap_or_default();

    let user = User {
        phone,
        name: name.to_string(),
        is_admin: request.is_admin,
        membership_type,
        remaining_lessons: request.remaining_lessons.unwrap_or(0),
        registered_lessons: Vec::new(),
        completed_lessons: 0,
        join_date: Some(schedule_time::now_iso()),
    };

    store.put_user(&user).await?;
    log::info!("👤 User created: {} ({})", user.phone, user.membership_type);
    Ok(user)
}

pub async fn update_user(
    store: &dyn StudioStore,
    phone: &str,
    update: UpdateUserRequest,
) -> Result<User, AppError> {
    if update.is_empty() {
        return Err(AppError::InvalidRequest("No fields to update".to_string()));
    }
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::InvalidRequest("Name cannot be empty".to_string()));
    }

    if !store.update_user(phone, &update).await? {
        return Err(AppError::NotFound(format!("User {} not found", phone)));
    }

    log::info!("✏️  User {} updated", phone);
    get_user(store, phone).await
}

pub async fn delete_user(store: &dyn StudioStore, phone: &str) -> Result<(), AppError> {
    if !store.delete_user(phone).await? {
        return Err(AppError::NotFound(format!("User {} not found", phone)));
    }
    log::info!("🗑️  User {} deleted", phone);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership;
    use crate::store::MemoryStore;

    fn request(phone: &str, name: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            phone: phone.to_string(),
            is_admin: false,
            membership_type: Some(membership::PUNCH_CARD.to_string()),
            remaining_lessons: Some(10),
        }
    }

    #[tokio::test]
    async fn create_starts_with_empty_history() {
        let store = MemoryStore::new();
        let user = create_user(&store, request("054-7805845", " Shira ")).await.unwrap();

        assert_eq!(user.phone, "0547805845");
        assert_eq!(user.name, "Shira");
        assert_eq!(user.remaining_lessons, 10);
        assert_eq!(user.completed_lessons, 0);
        assert!(user.registered_lessons.is_empty());
        assert!(user.join_date.is_some());
        assert!(user.membership_type.is_punch_card());
    }

    #[tokio::test]
    async fn create_rejects_bad_phone_duplicate_and_blank_name() {
        let store = MemoryStore::new();
        create_user(&store, request("0547805845", "Shira")).await.unwrap();

        for bad in [
            request("1234", "Shira"),
            request("0547805845", "Again"),
            request("0521111111", "   "),
        ] {
            assert!(matches!(
                create_user(&store, bad).await.unwrap_err(),
                AppError::InvalidRequest(_)
            ));
        }
        assert_eq!(list_users(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let store = MemoryStore::new();
        create_user(&store, request("0547805845", "Shira")).await.unwrap();

        let updated = update_user(
            &store,
            "0547805845",
            UpdateUserRequest {
                membership_type: Some(membership::TWICE_A_WEEK.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Shira");
        assert_eq!(updated.remaining_lessons, 10);
        assert_eq!(updated.membership_type.weekly_limit(), Some(2));

        let err = update_user(&store, "0547805845", UpdateUserRequest::default()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn missing_users_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(get_user(&store, "0500000001").await.unwrap_err(), AppError::NotFound(_)));
        assert!(matches!(delete_user(&store, "0500000001").await.unwrap_err(), AppError::NotFound(_)));
    }
}
