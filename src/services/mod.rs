pub mod auth_service;
pub mod booking_service;
pub mod catalog_service;
pub mod lesson_service;
pub mod stats_service;
pub mod user_service;
