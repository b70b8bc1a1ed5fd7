use actix_web::HttpResponse;
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);
static REGISTRATION_COUNT: AtomicU64 = AtomicU64::new(0);
static CANCELLATION_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_registration_count() {
    REGISTRATION_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_cancellation_count() {
    CANCELLATION_COUNT.fetch_add(1, Ordering::Relaxed);
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Request and error counters in Prometheus text format", body = String)
    )
)]
pub async fn get_metrics() -> HttpResponse {
    let requests = REQUEST_COUNT.load(Ordering::Relaxed);
    let errors = ERROR_COUNT.load(Ordering::Relaxed);
    let registrations = REGISTRATION_COUNT.load(Ordering::Relaxed);
    let cancellations = CANCELLATION_COUNT.load(Ordering::Relaxed);

    let metrics = format!(
        "# HELP http_requests_total Total number of HTTP requests\n\
         # TYPE http_requests_total counter\n\
         http_requests_total {}\n\
         \n\
         # HELP http_errors_total Total number of HTTP errors\n\
         # TYPE http_errors_total counter\n\
         http_errors_total {}\n\
         \n\
         # HELP lesson_registrations_total Successful lesson registrations\n\
         # TYPE lesson_registrations_total counter\n\
         lesson_registrations_total {}\n\
         \n\
         # HELP lesson_cancellations_total Successful lesson cancellations\n\
         # TYPE lesson_cancellations_total counter\n\
         lesson_cancellations_total {}\n",
        requests, errors, registrations, cancellations
    );

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_only_grow() {
        let before = ERROR_COUNT.load(Ordering::Relaxed);
        increment_error_count();
        assert!(ERROR_COUNT.load(Ordering::Relaxed) > before);
    }
}
