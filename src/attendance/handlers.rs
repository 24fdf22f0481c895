use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::admin::verify_admin, error::ApiError, registrants::repo::KNOWN_CAMPUSES,
    state::AppState,
};

use super::{
    dto::{
        AdminQuery, AdminVerifyRequest, HistoryQuery, HistoryResponse, LocationResponse,
        LocationUpsertRequest, LocationsResponse, SettingsResponse, SettingsUpdateRequest,
        UpdateStatusRequest, UpdateStatusResponse,
    },
    repo::{today_bucket, AttendanceRecord, AttendanceSettings, CampusLocation},
};

const DEFAULT_HISTORY_LIMIT: i64 = 30;

/// GET /api/attendance/admin/student-history
#[instrument(skip(state, q))]
pub async fn student_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    verify_admin(&state.config, q.password.as_deref())?;

    let student_id: i64 = q
        .student_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("studentId is required"))?
        .parse()
        .map_err(|_| ApiError::validation("studentId is required"))?;

    let limit = q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1);
    let records = AttendanceRecord::history(&state.db, student_id, limit).await?;
    Ok(Json(HistoryResponse {
        success: true,
        records,
    }))
}

/// POST /api/attendance/admin/update-status. Only `pending-checkouts` does
/// anything; other update types are accepted and report zero changes.
#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    verify_admin(&state.config, payload.password.as_deref())?;

    let updated_count = match payload.update_type.as_deref() {
        Some("pending-checkouts") => {
            let today = today_bucket();
            let n = AttendanceRecord::close_pending_checkouts(&state.db, &today).await?;
            info!(date = %today, updated = n, "pending check-outs demoted to half-day");
            n
        }
        _ => 0,
    };

    Ok(Json(UpdateStatusResponse {
        success: true,
        updated_count,
    }))
}

/// POST /api/attendance/admin/verify — the dashboard login check.
#[instrument(skip(state, payload))]
pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<AdminVerifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    verify_admin(&state.config, payload.password.as_deref())?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// OPTIONS /api/attendance/admin/verify — CORS preflight for the dashboard.
pub async fn verify_preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

/// GET /api/attendance/admin/settings — lazily creates the singleton.
#[instrument(skip(state, q))]
pub async fn get_settings(
    State(state): State<AppState>,
    Query(q): Query<AdminQuery>,
) -> Result<Json<SettingsResponse>, ApiError> {
    verify_admin(&state.config, q.password.as_deref())?;
    let settings = AttendanceSettings::load_or_init(&state.db).await?;
    Ok(Json(SettingsResponse {
        success: true,
        settings,
    }))
}

/// POST /api/attendance/admin/settings — partial update of the singleton.
#[instrument(skip(state, payload))]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<SettingsUpdateRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    verify_admin(&state.config, payload.password.as_deref())?;

    let mut settings = AttendanceSettings::load_or_init(&state.db).await?;
    if let Some(v) = payload.geo_location_enabled {
        settings.geo_location_enabled = v;
    }
    if let Some(v) = payload.default_radius {
        settings.default_radius = v;
    }
    if let Some(v) = payload.max_qr_validity_seconds {
        settings.max_qr_validity_seconds = v;
    }
    if let Some(v) = payload.multi_device_limit {
        settings.multi_device_limit = v;
    }
    if let Some(v) = payload.require_check_out {
        settings.require_check_out = v;
    }
    settings.updated_by = payload.updated_by.unwrap_or_else(|| "admin".into());
    settings.save(&state.db).await?;

    info!(updated_by = %settings.updated_by, "attendance settings updated");
    Ok(Json(SettingsResponse {
        success: true,
        settings,
    }))
}

/// GET /api/attendance/admin/locations
#[instrument(skip(state, q))]
pub async fn list_locations(
    State(state): State<AppState>,
    Query(q): Query<AdminQuery>,
) -> Result<Json<LocationsResponse>, ApiError> {
    verify_admin(&state.config, q.password.as_deref())?;
    let locations = CampusLocation::list(&state.db).await?;
    Ok(Json(LocationsResponse {
        success: true,
        locations,
    }))
}

/// POST /api/attendance/admin/locations — upsert keyed on the campus name.
#[instrument(skip(state, payload))]
pub async fn upsert_location(
    State(state): State<AppState>,
    Json(payload): Json<LocationUpsertRequest>,
) -> Result<Json<LocationResponse>, ApiError> {
    verify_admin(&state.config, payload.password.as_deref())?;

    let name = payload
        .name
        .as_deref()
        .map(str::to_lowercase)
        .ok_or_else(|| ApiError::validation("name is required"))?;
    if !KNOWN_CAMPUSES.contains(&name.as_str()) {
        return Err(ApiError::validation("unknown campus"));
    }
    let (Some(latitude), Some(longitude)) = (payload.latitude, payload.longitude) else {
        return Err(ApiError::validation("latitude and longitude are required"));
    };

    let location = CampusLocation::upsert(
        &state.db,
        &name,
        latitude,
        longitude,
        payload.radius.unwrap_or(100.0),
        payload.enabled.unwrap_or(true),
        payload.updated_by.as_deref().unwrap_or("admin"),
        time::OffsetDateTime::now_utc(),
    )
    .await?;

    info!(campus = %name, "campus location upserted");
    Ok(Json(LocationResponse {
        success: true,
        location,
    }))
}
