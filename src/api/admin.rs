// ==================== ADMIN ENDPOINTS ====================
// Mounted under /api/v1/admin behind `AuthMiddleware::admin()`.

use actix_web::{web, HttpResponse, ResponseError};

use crate::models::{
    CatalogEntryResponse, CatalogKind, CreateCatalogEntryRequest, CreateLessonRequest,
    CreateUserRequest, LessonResponse, UpdateUserRequest, UserInfo,
};
use crate::services::auth_service::Claims;
use crate::services::stats_service::{self, QuickStats};
use crate::services::{catalog_service, lesson_service, user_service};
use crate::state::AppState;
use crate::utils::schedule_time;

// ==================== LESSONS ====================

#[utoipa::path(
    post,
    path = "/api/v1/admin/lessons",
    tag = "Admin",
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 400, description = "Invalid lesson data"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_lesson(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateLessonRequest>,
) -> HttpResponse {
    log::info!("📅 POST /admin/lessons - {} {} by {}", request.date, request.time, claims.sub);

    let now = schedule_time::now_local();
    match lesson_service::create_lesson(state.store.as_ref(), request.into_inner(), now).await {
        Ok(lesson) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "lesson": LessonResponse::for_viewer(lesson, &claims.sub, true)
        })),
        Err(e) => {
            log::warn!("❌ Lesson not created: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/lessons/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 404, description = "Lesson not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_lesson(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let lesson_id = path.into_inner();

    match lesson_service::delete_lesson(state.store.as_ref(), &lesson_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Lesson deleted"
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/lessons",
    tag = "Admin",
    responses(
        (status = 200, description = "All lessons removed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_lessons(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    log::warn!("🗑️  DELETE /admin/lessons requested by {}", claims.sub);

    match lesson_service::clear_lessons(state.store.as_ref()).await {
        Ok(deleted) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "deleted": deleted
        })),
        Err(e) => {
            log::error!("❌ Failed to clear lessons: {}", e);
            e.error_response()
        }
    }
}

// ==================== USERS ====================

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "All users", body = [UserInfo])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(state: web::Data<AppState>) -> HttpResponse {
    match user_service::list_users(state.store.as_ref()).await {
        Ok(users) => {
            let users: Vec<UserInfo> = users.into_iter().map(UserInfo::from).collect();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "count": users.len(),
                "users": users
            }))
        }
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "Admin",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserInfo),
        (status = 400, description = "Invalid phone, empty name or phone already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    state: web::Data<AppState>,
    request: web::Json<CreateUserRequest>,
) -> HttpResponse {
    log::info!("👤 POST /admin/users - {}", request.phone);

    match user_service::create_user(state.store.as_ref(), request.into_inner()).await {
        Ok(user) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "user": UserInfo::from(user)
        })),
        Err(e) => {
            log::warn!("❌ User not created: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{phone}",
    tag = "Admin",
    params(("phone" = String, Path, description = "User phone")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserInfo),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateUserRequest>,
) -> HttpResponse {
    let phone = path.into_inner();

    match user_service::update_user(state.store.as_ref(), &phone, request.into_inner()).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": UserInfo::from(user)
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{phone}",
    tag = "Admin",
    params(("phone" = String, Path, description = "User phone")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let phone = path.into_inner();

    match user_service::delete_user(state.store.as_ref(), &phone).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "User deleted"
        })),
        Err(e) => e.error_response(),
    }
}

// ==================== CATALOG ====================

async fn list_catalog(state: &AppState, kind: CatalogKind) -> HttpResponse {
    match catalog_service::list_entries(state.store.as_ref(), kind).await {
        Ok(entries) => {
            let entries: Vec<CatalogEntryResponse> =
                entries.into_iter().map(CatalogEntryResponse::from).collect();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "entries": entries
            }))
        }
        Err(e) => e.error_response(),
    }
}

async fn add_catalog(state: &AppState, kind: CatalogKind, name: &str) -> HttpResponse {
    match catalog_service::add_entry(state.store.as_ref(), kind, name).await {
        Ok(entry) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "entry": CatalogEntryResponse::from(entry)
        })),
        Err(e) => e.error_response(),
    }
}

async fn delete_catalog(state: &AppState, kind: CatalogKind, entry_id: &str) -> HttpResponse {
    match catalog_service::delete_entry(state.store.as_ref(), kind, entry_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/lesson-types",
    tag = "Admin",
    responses((status = 200, description = "Lesson types", body = [CatalogEntryResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_lesson_types(state: web::Data<AppState>) -> HttpResponse {
    list_catalog(&state, CatalogKind::LessonTypes).await
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/lesson-types",
    tag = "Admin",
    request_body = CreateCatalogEntryRequest,
    responses(
        (status = 201, description = "Lesson type added", body = CatalogEntryResponse),
        (status = 400, description = "Empty name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_lesson_type(
    state: web::Data<AppState>,
    request: web::Json<CreateCatalogEntryRequest>,
) -> HttpResponse {
    add_catalog(&state, CatalogKind::LessonTypes, &request.name).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/lesson-types/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Entry id")),
    responses(
        (status = 200, description = "Lesson type deleted"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_lesson_type(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    delete_catalog(&state, CatalogKind::LessonTypes, &path).await
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/memberships",
    tag = "Admin",
    responses((status = 200, description = "Membership plans", body = [CatalogEntryResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_memberships(state: web::Data<AppState>) -> HttpResponse {
    list_catalog(&state, CatalogKind::Memberships).await
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/memberships",
    tag = "Admin",
    request_body = CreateCatalogEntryRequest,
    responses(
        (status = 201, description = "Membership plan added", body = CatalogEntryResponse),
        (status = 400, description = "Empty name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_membership(
    state: web::Data<AppState>,
    request: web::Json<CreateCatalogEntryRequest>,
) -> HttpResponse {
    add_catalog(&state, CatalogKind::Memberships, &request.name).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/memberships/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Entry id")),
    responses(
        (status = 200, description = "Membership plan deleted"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_membership(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    delete_catalog(&state, CatalogKind::Memberships, &path).await
}

// ==================== STATS ====================

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    tag = "Admin",
    responses((status = 200, description = "Dashboard numbers", body = QuickStats)),
    security(("bearer_auth" = []))
)]
pub async fn get_stats(state: web::Data<AppState>) -> HttpResponse {
    let now = schedule_time::now_local();

    match stats_service::load_quick_stats(state.store.as_ref(), now).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "stats": stats
        })),
        Err(e) => {
            log::error!("❌ Failed to compute stats: {}", e);
            e.error_response()
        }
    }
}
