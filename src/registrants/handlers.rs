use axum::{
    extract::{FromRef, Query, State},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{admin::verify_admin, token::JwtKeys},
    error::ApiError,
    state::AppState,
};

use super::{
    dto::{CampusCounts, RegisterRequest, RegisterResponse, RosterQuery, RosterResponse},
    repo::{NewRegistrant, TestRegistrant},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn soft_failure(message: &str) -> Json<RegisterResponse> {
    Json(RegisterResponse {
        message: message.to_string(),
        success: false,
        token: None,
    })
}

/// POST /api/testusers. No password anywhere; the issued token is the
/// registrant's whole identity. Validation failures answer 200 with
/// `success:false` (preserved upstream behavior, not a 400).
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let (Some(name), Some(email), Some(regno), Some(phone), Some(branch)) = (
        required(&payload.name),
        required(&payload.email),
        required(&payload.regno),
        required(&payload.phone),
        required(&payload.branch),
    ) else {
        warn!("registration rejected: missing required fields");
        return Ok(soft_failure("All fields are required"));
    };

    let email = email.to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "registration rejected: invalid email");
        return Ok(soft_failure("Invalid email"));
    }

    let keys = JwtKeys::from_ref(&state);

    // Re-registering an existing email is treated as login: fresh token,
    // no second row.
    if let Some(existing) = TestRegistrant::find_by_email(&state.db, &email).await? {
        let token = keys.sign(&existing.email)?;
        info!(email = %email, "existing registrant re-issued a token");
        return Ok(Json(RegisterResponse {
            message: "User already registered".into(),
            success: true,
            token: Some(token),
        }));
    }

    let created = TestRegistrant::create(
        &state.db,
        NewRegistrant {
            name,
            email: &email,
            regno,
            phone,
            branch,
            domain: required(&payload.domain),
            campus: required(&payload.campus),
        },
    )
    .await?;
    let token = keys.sign(&created.email)?;

    info!(email = %email, id = created.id, "registrant created");
    Ok(Json(RegisterResponse {
        message: "User registered successfully".into(),
        success: true,
        token: Some(token),
    }))
}

/// GET /api/attendance/admin/students. Campus counts always cover the whole
/// table; the filter only narrows the returned list.
#[instrument(skip(state, q))]
pub async fn list_students(
    State(state): State<AppState>,
    Query(q): Query<RosterQuery>,
) -> Result<Json<RosterResponse>, ApiError> {
    verify_admin(&state.config, q.password.as_deref())?;

    let filter = q
        .campus
        .as_deref()
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));
    let students = TestRegistrant::list(&state.db, filter).await?;

    let mut counts = CampusCounts::default();
    for row in TestRegistrant::campus_counts(&state.db).await? {
        match row.campus.as_str() {
            "bbsr" => counts.bbsr = row.count,
            "pkd" => counts.pkd = row.count,
            "vzm" => counts.vzm = row.count,
            // unknown campus values are listed but never counted
            _ => {}
        }
    }

    let total_count = students.len();
    Ok(Json(RosterResponse {
        success: true,
        students,
        campus_counts: counts,
        total_count,
    }))
}
