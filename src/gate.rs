use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

pub const ADMIN_COOKIE: &str = "adminAuthenticated";
pub const DASHBOARD_PATH: &str = "/attendance-admin-dashboard";
pub const LOGIN_PATH: &str = "/attendance-admin";

const CSP: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'; \
                   style-src 'self' 'unsafe-inline'; img-src 'self' data:; \
                   connect-src 'self' https://api.qrserver.com";

fn cookie_value<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    let raw = req.headers().get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Edge gate: redirects unauthenticated dashboard visits to the login page
/// and stamps fixed security headers on every attendance-related response.
pub async fn edge_gate(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    if path.starts_with(DASHBOARD_PATH) && cookie_value(&req, ADMIN_COOKIE) != Some("true") {
        debug!(%path, "unauthenticated dashboard visit redirected");
        return Redirect::temporary(LOGIN_PATH).into_response();
    }

    let attendance_scoped =
        path.starts_with("/attendance") || path.starts_with("/api/attendance");

    let mut res = next.run(req).await;
    if attendance_scoped {
        let headers = res.headers_mut();
        headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
        headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
        headers.insert(
            "referrer-policy",
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        );
        headers.insert("x-xss-protection", HeaderValue::from_static("1; mode=block"));
        headers.insert(
            "content-security-policy",
            HeaderValue::from_static(CSP),
        );
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::build_app, state::AppState};
    use axum::{body::Body, http::StatusCode};
    use tower::ServiceExt;

    async fn send(uri: &str, cookie: Option<&str>) -> Response {
        let state = AppState::test().await;
        let app = build_app(state);
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn dashboard_redirects_without_cookie() {
        let res = send("/attendance-admin-dashboard", None).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "/attendance-admin"
        );
    }

    #[tokio::test]
    async fn dashboard_redirects_with_wrong_cookie() {
        let res = send("/attendance-admin-dashboard", Some("adminAuthenticated=false")).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn dashboard_passes_with_cookie() {
        let res = send(
            "/attendance-admin-dashboard",
            Some("other=1; adminAuthenticated=true"),
        )
        .await;
        // page itself is served elsewhere; no redirect is the contract
        assert_ne!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn attendance_responses_carry_security_headers() {
        let res = send("/api/attendance/admin/students?password=test-admin", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let h = res.headers();
        assert_eq!(h.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(h.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(
            h.get("referrer-policy").unwrap(),
            "strict-origin-when-cross-origin"
        );
        assert_eq!(h.get("x-xss-protection").unwrap(), "1; mode=block");
        assert!(h
            .get("content-security-policy")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("api.qrserver.com"));
    }

    #[tokio::test]
    async fn unrelated_paths_stay_clean() {
        let res = send("/api/userdata", None).await;
        assert!(res.headers().get("x-frame-options").is_none());
    }
}
