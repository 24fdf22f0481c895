mod dto;
pub mod handlers;
pub mod repo;
pub mod session;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/attendance/admin/student-history",
            get(handlers::student_history),
        )
        .route(
            "/api/attendance/admin/update-status",
            post(handlers::update_status),
        )
        .route(
            "/api/attendance/admin/verify",
            post(handlers::verify).options(handlers::verify_preflight),
        )
        .route(
            "/api/attendance/admin/settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
        .route(
            "/api/attendance/admin/locations",
            get(handlers::list_locations).post(handlers::upsert_location),
        )
        .route("/api/attendance/session", post(session::start_session))
        .route("/api/attendance/checkin", post(session::check_in))
        .route("/api/attendance/checkout", post(session::check_out))
}
