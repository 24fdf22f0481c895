use axum::{extract::State, Json};
use rand::{distributions::Alphanumeric, Rng};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::token::AuthRegistrant, error::ApiError, registrants::repo::TestRegistrant,
    state::AppState,
};

use super::{
    dto::{CheckRequest, SessionResponse},
    repo::{today_bucket, AttendanceRecord, AttendanceToken},
};

fn new_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// POST /api/attendance/session — trades the registrant's bearer token for
/// a short-lived attendance token (one per email, 12h TTL).
#[instrument(skip(state))]
pub async fn start_session(
    State(state): State<AppState>,
    AuthRegistrant(email): AuthRegistrant,
) -> Result<Json<SessionResponse>, ApiError> {
    let Some(registrant) = TestRegistrant::find_by_email(&state.db, &email).await? else {
        warn!(email = %email, "session start for unknown registrant");
        return Err(ApiError::unauthorized("Unknown registrant"));
    };

    let now = OffsetDateTime::now_utc();
    AttendanceToken::purge_expired(&state.db, now).await?;

    let token = Uuid::new_v4().to_string();
    let salt = new_salt();
    let row =
        AttendanceToken::upsert(&state.db, &email, registrant.id, &token, &salt, now).await?;

    info!(email = %email, "attendance session started");
    Ok(Json(SessionResponse {
        success: true,
        token: row.token,
    }))
}

async fn resolve_token(
    state: &AppState,
    submitted: Option<&str>,
) -> Result<AttendanceToken, ApiError> {
    let token = submitted
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Attendance token is required"))?;
    let now = OffsetDateTime::now_utc();
    AttendanceToken::find_active(&state.db, token, now)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired attendance token"))
}

/// POST /api/attendance/checkin — one record per registrant per day.
#[instrument(skip(state, payload))]
pub async fn check_in(
    State(state): State<AppState>,
    Json(payload): Json<CheckRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = resolve_token(&state, payload.token.as_deref()).await?;

    let now = OffsetDateTime::now_utc();
    let today = today_bucket();
    if AttendanceRecord::find_for_day(&state.db, token.test_user_id, &today)
        .await?
        .is_some()
    {
        return Ok(Json(
            json!({ "success": false, "message": "Already checked in" }),
        ));
    }

    let record = AttendanceRecord::check_in(&state.db, token.test_user_id, &today, now).await?;
    AttendanceToken::touch(&state.db, token.id, now).await?;

    info!(email = %token.email, date = %today, "checked in");
    Ok(Json(json!({ "success": true, "record": record })))
}

/// POST /api/attendance/checkout — closes today's open record.
#[instrument(skip(state, payload))]
pub async fn check_out(
    State(state): State<AppState>,
    Json(payload): Json<CheckRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = resolve_token(&state, payload.token.as_deref()).await?;

    let now = OffsetDateTime::now_utc();
    let today = today_bucket();
    let changed = AttendanceRecord::check_out(&state.db, token.test_user_id, &today, now).await?;
    if changed == 0 {
        return Ok(Json(
            json!({ "success": false, "message": "No open check-in for today" }),
        ));
    }
    AttendanceToken::touch(&state.db, token.id, now).await?;

    info!(email = %token.email, date = %today, "checked out");
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::build_app,
        auth::token::JwtKeys,
        registrants::repo::NewRegistrant,
    };
    use axum::{
        body::Body,
        extract::FromRef,
        http::{header, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    async fn seed_registrant(state: &AppState, email: &str) -> i64 {
        TestRegistrant::create(
            &state.db,
            NewRegistrant {
                name: "Student",
                email,
                regno: "21CS002",
                phone: "8888888888",
                branch: "ECE",
                domain: Some("web"),
                campus: Some("pkd"),
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn post(
        state: &AppState,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let app = build_app(state.clone());
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = body.map(|b| b.to_string()).unwrap_or_else(|| "{}".into());
        let res = app
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn session_requires_a_valid_bearer_token() {
        let state = AppState::test().await;
        let (status, _) = post(&state, "/api/attendance/session", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) =
            post(&state, "/api/attendance/session", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_rejects_unknown_registrants() {
        let state = AppState::test().await;
        let jwt = JwtKeys::from_ref(&state).sign("nobody@example.com").unwrap();
        let (status, _) = post(&state, "/api/attendance/session", Some(&jwt), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_is_one_token_per_email() {
        let state = AppState::test().await;
        seed_registrant(&state, "s@x.co").await;
        let jwt = JwtKeys::from_ref(&state).sign("s@x.co").unwrap();

        let (status, first) = post(&state, "/api/attendance/session", Some(&jwt), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["success"], true);
        let (_, second) = post(&state, "/api/attendance/session", Some(&jwt), None).await;
        assert_ne!(first["token"], second["token"]);

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendance_tokens WHERE email = 's@x.co'")
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn check_in_then_out_happy_path() {
        let state = AppState::test().await;
        seed_registrant(&state, "c@x.co").await;
        let jwt = JwtKeys::from_ref(&state).sign("c@x.co").unwrap();
        let (_, session) = post(&state, "/api/attendance/session", Some(&jwt), None).await;
        let token = session["token"].as_str().unwrap().to_string();

        let (status, body) = post(
            &state,
            "/api/attendance/checkin",
            None,
            Some(json!({ "token": token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["record"]["status"], "present");
        assert!(body["record"]["checkInTime"].is_string());
        assert!(body["record"]["checkOutTime"].is_null());

        // second check-in the same day is refused softly
        let (status, body) = post(
            &state,
            "/api/attendance/checkin",
            None,
            Some(json!({ "token": token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);

        let (_, body) = post(
            &state,
            "/api/attendance/checkout",
            None,
            Some(json!({ "token": token })),
        )
        .await;
        assert_eq!(body["success"], true);

        // nothing left open
        let (_, body) = post(
            &state,
            "/api/attendance/checkout",
            None,
            Some(json!({ "token": token })),
        )
        .await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn check_in_rejects_unknown_tokens() {
        let state = AppState::test().await;
        let (status, _) = post(
            &state,
            "/api/attendance/checkin",
            None,
            Some(json!({ "token": "not-a-session" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
