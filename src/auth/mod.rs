use crate::state::AppState;
use axum::{routing::get, Router};

pub mod admin;
pub mod repo;
pub mod session;
pub mod token;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/me", get(session::get_me))
}
