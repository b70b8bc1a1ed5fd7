mod api;
mod config;
mod database;
mod jobs;
mod middleware;
mod models;
mod seeds;
mod services;
mod state;
mod store;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, StoreBackend};
use crate::state::AppState;
use crate::store::{MemoryStore, MongoStore, SharedStore};

fn io_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

async fn build_store(config: &AppConfig) -> std::io::Result<SharedStore> {
    match config.store_backend {
        StoreBackend::MongoDB => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| io_error("DATABASE_URL must be set".to_string()))?;

            let db = database::MongoDB::new(url)
                .await
                .map_err(|e| io_error(format!("Failed to connect to MongoDB: {}", e)))?;

            log::info!("✅ MongoDB connected successfully");
            Ok(Arc::new(MongoStore::new(db)))
        }
        StoreBackend::Memory => {
            log::warn!("⚠️  Using in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io_error)?;

    log::info!("🚀 Starting Studio Booking Service...");
    log::info!("📊 Store backend: {}", config.store_backend);

    let store = build_store(&config).await?;

    // 🌱 Admin account and default membership plans
    if let Err(e) = seeds::studio_seed::seed_studio(store.as_ref(), &config).await {
        log::error!("❌ Seeding failed: {}", e);
    }

    // 📅 Background jobs
    jobs::lesson_activity::start_lesson_activity_refresh(store.clone(), config.activity_refresh_secs);

    let host = config.host.clone();
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let state = web::Data::new(AppState::new(store, config));

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
