use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::api::metrics;
use crate::models::LessonResponse;
use crate::services::auth_service::Claims;
use crate::services::booking_service::{self, BookingReceipt, Eligibility};
use crate::services::lesson_service;
use crate::state::AppState;
use crate::utils::schedule_time;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LessonsQuery {
    /// Include lessons that already started
    #[serde(default)]
    pub all: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons",
    tag = "Lessons",
    params(LessonsQuery),
    responses(
        (status = 200, description = "Lessons ordered by start", body = [LessonResponse])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_lessons(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    query: web::Query<LessonsQuery>,
) -> HttpResponse {
    let now = schedule_time::now_local();

    match lesson_service::list_lessons(state.store.as_ref(), !query.all, now).await {
        Ok(lessons) => {
            let lessons: Vec<LessonResponse> = lessons
                .into_iter()
                .map(|l| LessonResponse::for_viewer(l, &claims.sub, claims.is_admin))
                .collect();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "count": lessons.len(),
                "lessons": lessons
            }))
        }
        Err(e) => {
            log::error!("❌ Failed to list lessons: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{id}",
    tag = "Lessons",
    params(("id" = String, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Lesson found", body = LessonResponse),
        (status = 404, description = "Lesson not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_lesson(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    let lesson_id = path.into_inner();

    match lesson_service::get_lesson(state.store.as_ref(), &lesson_id).await {
        Ok(lesson) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "lesson": LessonResponse::for_viewer(lesson, &claims.sub, claims.is_admin)
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{id}/eligibility",
    tag = "Lessons",
    params(("id" = String, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Whether the caller's plan allows this lesson", body = Eligibility),
        (status = 404, description = "Lesson or user not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_eligibility(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    let lesson_id = path.into_inner();

    match booking_service::eligibility_by_id(state.store.as_ref(), &claims.sub, &lesson_id).await {
        Ok(eligibility) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "eligibility": eligibility
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{id}/register",
    tag = "Lessons",
    params(("id" = String, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Registered", body = BookingReceipt),
        (status = 404, description = "Lesson or user not found"),
        (status = 409, description = "Quota reached, lesson full, already started or already registered"),
        (status = 500, description = "Lesson updated but the user record was not")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    let lesson_id = path.into_inner();
    log::info!("📝 POST /lessons/{}/register - {}", lesson_id, claims.sub);

    let now = schedule_time::now_local();
    match booking_service::register_by_id(state.store.as_ref(), &claims.sub, &lesson_id, now).await {
        Ok(receipt) => {
            metrics::increment_registration_count();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "booking": receipt
            }))
        }
        Err(e) => {
            log::warn!("❌ Registration rejected: {} - {}", claims.sub, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{id}/cancel",
    tag = "Lessons",
    params(("id" = String, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Registration cancelled", body = BookingReceipt),
        (status = 404, description = "Lesson or user not found"),
        (status = 409, description = "Not registered or inside the cancellation window"),
        (status = 500, description = "Lesson updated but the user record was not")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    let lesson_id = path.into_inner();
    log::info!("↩️  POST /lessons/{}/cancel - {}", lesson_id, claims.sub);

    let now = schedule_time::now_local();
    let window = state.config.cancellation_window_hours;
    match booking_service::cancel_by_id(state.store.as_ref(), &claims.sub, &lesson_id, now, window).await {
        Ok(receipt) => {
            metrics::increment_cancellation_count();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "booking": receipt
            }))
        }
        Err(e) => {
            log::warn!("❌ Cancellation rejected: {} - {}", claims.sub, e);
            e.error_response()
        }
    }
}
