use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Studio Booking Service API",
        version = "1.0.0",
        description = "Lesson scheduling and registration for a pilates studio.\n\n**Authentication:** log in with a registered phone number and send the returned JWT as a Bearer token.\n\n**Booking rules:** weekly plans cap registrations per Sunday-Saturday week, punch cards spend one credit per lesson and get it back on cancellation.",
        contact(
            name = "Studio Booking Team"
        )
    ),
    paths(
        // Auth
        crate::api::auth::login,
        crate::api::auth::get_me,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Lessons
        crate::api::lessons::list_lessons,
        crate::api::lessons::get_lesson,
        crate::api::lessons::get_eligibility,
        crate::api::lessons::register,
        crate::api::lessons::cancel,

        // Me
        crate::api::me::my_lessons,
        crate::api::me::my_summary,

        // Admin
        crate::api::admin::create_lesson,
        crate::api::admin::delete_lesson,
        crate::api::admin::clear_lessons,
        crate::api::admin::list_users,
        crate::api::admin::create_user,
        crate::api::admin::update_user,
        crate::api::admin::delete_user,
        crate::api::admin::list_lesson_types,
        crate::api::admin::add_lesson_type,
        crate::api::admin::delete_lesson_type,
        crate::api::admin::list_memberships,
        crate::api::admin::add_membership,
        crate::api::admin::delete_membership,
        crate::api::admin::get_stats,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,
            crate::models::UserInfo,

            // Health
            crate::api::health::HealthResponse,

            // Lessons & booking
            crate::models::LessonResponse,
            crate::models::RegisteredLesson,
            crate::models::CreateLessonRequest,
            crate::services::booking_service::Eligibility,
            crate::services::booking_service::BookingReceipt,

            // Users & catalog
            crate::models::CreateUserRequest,
            crate::models::UpdateUserRequest,
            crate::models::CreateCatalogEntryRequest,
            crate::models::CatalogEntryResponse,

            // Stats
            crate::services::stats_service::QuickStats,
            crate::services::stats_service::UserSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Phone-number login and the current user's profile."),
        (name = "Health", description = "Health check and request counters for monitoring."),
        (name = "Lessons", description = "Browse the schedule, check plan eligibility, register and cancel."),
        (name = "Me", description = "The caller's registered lessons and activity summary."),
        (name = "Admin", description = "Lesson, user and catalog management plus dashboard statistics. Admin token required."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/v1/auth/login"))
                        .build()
                ),
            );
        }
    }
}
