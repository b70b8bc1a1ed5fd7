use actix_web::{web, HttpResponse, ResponseError};

use crate::models::UserInfo;
use crate::services::auth_service::{self, AuthResponse, Claims, LoginRequest};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Malformed phone number"),
        (status = 401, description = "Phone number not registered")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/login - phone: {}", request.phone);

    match auth_service::login(state.store.as_ref(), &state.config, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", response.user.phone);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.phone, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "User information retrieved", body = UserInfo),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    log::info!("👤 GET /auth/me - {}", claims.sub);

    match auth_service::get_current_user(state.store.as_ref(), &state.config, &claims).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": user
        })),
        Err(e) => {
            log::error!("❌ Failed to get user {}: {}", claims.sub, e);
            e.error_response()
        }
    }
}
