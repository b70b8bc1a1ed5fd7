use actix_web::{web, HttpResponse, ResponseError};

use crate::models::RegisteredLesson;
use crate::services::auth_service::Claims;
use crate::services::stats_service::{self, UserSummary};
use crate::services::user_service;
use crate::state::AppState;
use crate::utils::schedule_time;

#[utoipa::path(
    get,
    path = "/api/v1/me/lessons",
    tag = "Me",
    responses(
        (status = 200, description = "Lessons the caller is registered for", body = [RegisteredLesson]),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_lessons(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    match user_service::get_user(state.store.as_ref(), &claims.sub).await {
        Ok(user) => {
            let mut lessons = user.registered_lessons;
            lessons.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "count": lessons.len(),
                "lessons": lessons
            }))
        }
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/me/summary",
    tag = "Me",
    responses(
        (status = 200, description = "Weekly lessons, past count and monthly breakdown", body = UserSummary),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_summary(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let today = schedule_time::now_local().date();

    match stats_service::load_user_summary(state.store.as_ref(), &claims.sub, today).await {
        Ok(summary) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "summary": summary
        })),
        Err(e) => e.error_response(),
    }
}
