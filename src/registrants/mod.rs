mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/testusers", post(handlers::register))
        .route(
            "/api/attendance/admin/students",
            get(handlers::list_students),
        )
}
