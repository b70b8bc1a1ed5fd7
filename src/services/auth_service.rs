use crate::{
    config::AppConfig,
    models::{MembershipType, User, UserInfo},
    store::StudioStore,
    utils::AppError,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // phone
    pub name: String,
    pub is_admin: bool,
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    pub jti: String,           // JWT ID
    pub iss: String,           // issuer
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub phone: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

/// Keeps only digits, the way the login form filters input
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Israeli mobile format: 05XXXXXXXX
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.starts_with("05") && phone.chars().all(|c| c.is_ascii_digit())
}

// Generate JWT token
pub fn generate_jwt(user: &User, config: &AppConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.phone.clone(),
        name: user.name.clone(),
        is_admin: user.is_admin,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(config.jwt_ttl_hours)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        iss: config.jwt_issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::InvalidRequest(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(token: &str, config: &AppConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);

    let mut issuers = HashSet::new();
    issuers.insert(config.jwt_issuer.clone());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

fn synthetic_admin(config: &AppConfig) -> User {
    User {
        phone: config.admin_phone.clone(),
        name: config.admin_name.clone(),
        is_admin: true,
        membership_type: MembershipType::default(),
        remaining_lessons: 0,
        registered_lessons: Vec::new(),
        completed_lessons: 0,
        join_date: None,
    }
}

// Phone login
pub async fn login(
    store: &dyn StudioStore,
    config: &AppConfig,
    request: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    let phone = normalize_phone(&request.phone);

    if !is_valid_phone(&phone) {
        return Err(AppError::InvalidRequest(
            "נא להזין מספר טלפון תקין בפורמט: 05XXXXXXXX".to_string(),
        ));
    }

    let user = if phone == config.admin_phone {
        log::info!("🛡️  Admin login detected");
        let mut admin = store
            .get_user(&phone)
            .await?
            .unwrap_or_else(|| synthetic_admin(config));
        admin.is_admin = true;
        admin
    } else {
        store
            .get_user(&phone)
            .await?
            .ok_or_else(|| AppError::Unauthorized("מספר טלפון לא נמצא במערכת".to_string()))?
    };

    let token = generate_jwt(&user, config)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: UserInfo::from(user),
    })
}

// Get current user
pub async fn get_current_user(
    store: &dyn StudioStore,
    config: &AppConfig,
    claims: &Claims,
) -> Result<UserInfo, AppError> {
    match store.get_user(&claims.sub).await? {
        Some(user) => Ok(UserInfo::from(user)),
        None if claims.sub == config.admin_phone => Ok(UserInfo::from(synthetic_admin(config))),
        None => Err(AppError::NotFound(format!("User {} not found", claims.sub))),
    }
}
