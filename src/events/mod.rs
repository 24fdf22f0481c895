mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/userdata", get(handlers::list_userdata))
        .route(
            "/api/claim",
            get(handlers::lookup_claim).post(handlers::claim_ticket),
        )
}
