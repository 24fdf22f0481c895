use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::{error, instrument};

use crate::{events::repo::EventRegistration, state::AppState};

use super::dto::{ClaimQuery, PopulatedRegistration, PopulatedUser};

/// GET /api/userdata — every registration with its user inlined. This route
/// predates the `success` envelope and keeps its `{status, data, length}`
/// shape.
#[instrument(skip(state))]
pub async fn list_userdata(State(state): State<AppState>) -> impl IntoResponse {
    match EventRegistration::list_with_users(&state.db).await {
        Ok(rows) => {
            let data: Vec<PopulatedRegistration> = rows
                .into_iter()
                .map(|r| PopulatedRegistration {
                    id: r.id,
                    eventid: r.eventid,
                    eventname: r.eventname,
                    ticketid: r.ticketid,
                    email: r.email,
                    iszentrone: r.iszentrone,
                    user: PopulatedUser {
                        id: r.user_id,
                        email: r.user_email,
                    },
                })
                .collect();
            let length = data.len();
            (
                StatusCode::OK,
                Json(json!({ "status": 200, "data": data, "length": length })),
            )
        }
        Err(e) => {
            error!(error = %e, "userdata enumeration failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": 500, "message": "Error fetching user data" })),
            )
        }
    }
}

/// GET /api/claim — echoes a present id back; no store access happens here.
#[instrument]
pub async fn lookup_claim(Query(q): Query<ClaimQuery>) -> Json<serde_json::Value> {
    match q.id.as_deref() {
        Some(id) if !id.is_empty() => Json(json!({ "success": true, "id": id })),
        _ => Json(json!({ "success": false })),
    }
}

/// POST /api/claim — declared but unimplemented upstream; kept as a no-op.
#[instrument]
pub async fn claim_ticket() -> Json<serde_json::Value> {
    Json(json!({}))
}
