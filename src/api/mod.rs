pub mod admin;
pub mod auth;
pub mod health;
pub mod lessons;
pub mod me;
pub mod metrics;
pub mod swagger;

use actix_web::web;

use crate::middleware::AuthMiddleware;

/// Every HTTP route except Swagger UI
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(health::health_check))
        // Metrics
        .route("/metrics", web::get().to(metrics::get_metrics))
        // Auth endpoints
        .service(
            web::scope("/api/v1/auth")
                .route("/login", web::post().to(auth::login))
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware::user())
                        .route(web::get().to(auth::get_me)),
                ),
        )
        // ==================== MEMBERS ====================
        .service(
            web::scope("/api/v1/lessons")
                .wrap(AuthMiddleware::user())
                .route("", web::get().to(lessons::list_lessons))
                .route("/{id}", web::get().to(lessons::get_lesson))
                .route("/{id}/eligibility", web::get().to(lessons::get_eligibility))
                .route("/{id}/register", web::post().to(lessons::register))
                .route("/{id}/cancel", web::post().to(lessons::cancel)),
        )
        .service(
            web::scope("/api/v1/me")
                .wrap(AuthMiddleware::user())
                .route("/lessons", web::get().to(me::my_lessons))
                .route("/summary", web::get().to(me::my_summary)),
        )
        // ==================== ADMIN ====================
        .service(
            web::scope("/api/v1/admin")
                .wrap(AuthMiddleware::admin())
                .route("/lessons", web::post().to(admin::create_lesson))
                .route("/lessons", web::delete().to(admin::clear_lessons))
                .route("/lessons/{id}", web::delete().to(admin::delete_lesson))
                .route("/users", web::get().to(admin::list_users))
                .route("/users", web::post().to(admin::create_user))
                .route("/users/{phone}", web::put().to(admin::update_user))
                .route("/users/{phone}", web::delete().to(admin::delete_user))
                .route("/lesson-types", web::get().to(admin::list_lesson_types))
                .route("/lesson-types", web::post().to(admin::add_lesson_type))
                .route("/lesson-types/{id}", web::delete().to(admin::delete_lesson_type))
                .route("/memberships", web::get().to(admin::list_memberships))
                .route("/memberships", web::post().to(admin::add_membership))
                .route("/memberships/{id}", web::delete().to(admin::delete_membership))
                .route("/stats", web::get().to(admin::get_stats)),
        );
}
