use axum::{
    extract::{FromRef, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};
use tracing::{error, instrument, warn};

use crate::{
    auth::{repo::User, token::JwtKeys},
    events::repo::EventRegistration,
    state::AppState,
};

pub const SESSION_COOKIE: &str = "token";
pub const EVENT_NAME: &str = "zenetrone";

/// Resolves the current user from the session cookie. Every outcome is a
/// 200; callers treat anything but `success:true` as unauthenticated.
#[instrument(skip(state, jar))]
pub async fn get_me(State(state): State<AppState>, jar: CookieJar) -> Json<Value> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Json(json!({ "success": false, "message": "Not authenticated" }));
    };

    let keys = JwtKeys::from_ref(&state);
    let claims = match keys.verify(cookie.value()) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "session cookie failed verification");
            return Json(json!({ "success": false, "message": "Error verifying user" }));
        }
    };

    let user = match User::find_by_email(&state.db, &claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return Json(json!({ "success": false, "message": "User not found" }));
        }
        Err(e) => {
            error!(error = %e, "user lookup failed");
            return Json(json!({ "success": false, "message": "Error verifying user" }));
        }
    };

    let registration =
        match EventRegistration::find_by_email_and_event(&state.db, &claims.sub, EVENT_NAME).await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "registration lookup failed");
                return Json(json!({ "success": false, "message": "Error verifying user" }));
            }
        };

    Json(json!({ "success": true, "user": user, "registration": registration }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_app;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn call_me(state: AppState, cookie: Option<String>) -> (StatusCode, Value) {
        let app = build_app(state);
        let mut builder = Request::builder().uri("/api/me");
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        let res = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn no_cookie_is_not_authenticated() {
        let state = AppState::test().await;
        let (status, body) = call_me(state, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not authenticated");
    }

    #[tokio::test]
    async fn bad_cookie_fails_softly() {
        let state = AppState::test().await;
        let (status, body) = call_me(state, Some("token=garbage".into())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Error verifying user");
    }

    #[tokio::test]
    async fn valid_cookie_unknown_user() {
        let state = AppState::test().await;
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign("ghost@example.com").unwrap();
        let (status, body) = call_me(state, Some(format!("token={token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn valid_cookie_returns_user_and_registration() {
        let state = AppState::test().await;
        let user = User::create(&state.db, "alice@example.com", "hash").await.unwrap();
        EventRegistration::create(
            &state.db,
            user.id,
            "ev-1",
            EVENT_NAME,
            "ticket-42",
            "alice@example.com",
            true,
        )
        .await
        .unwrap();

        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign("alice@example.com").unwrap();
        let (status, body) = call_me(state, Some(format!("token={token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["email"], "alice@example.com");
        // password hash must never leave the server
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(body["registration"]["ticketid"], "ticket-42");
    }
}
