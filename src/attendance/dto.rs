use serde::{Deserialize, Serialize};

use super::repo::{AttendanceRecord, AttendanceSettings, CampusLocation};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub password: Option<String>,
    pub student_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub password: Option<String>,
    pub update_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub updated_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct AdminVerifyRequest {
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdateRequest {
    pub password: Option<String>,
    pub geo_location_enabled: Option<bool>,
    pub default_radius: Option<f64>,
    pub max_qr_validity_seconds: Option<i64>,
    pub multi_device_limit: Option<i64>,
    pub require_check_out: Option<bool>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub success: bool,
    pub settings: AttendanceSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpsertRequest {
    pub password: Option<String>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub enabled: Option<bool>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub success: bool,
    pub locations: Vec<CampusLocation>,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub success: bool,
    pub location: CampusLocation,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub token: Option<String>,
}
