use serde::{Deserialize, Serialize};

use super::repo::TestRegistrant;

/// All fields optional at the wire level; required ones are checked by the
/// handler so a missing field gets the soft `success:false` answer instead
/// of a deserialization 422.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub regno: Option<String>,
    pub phone: Option<String>,
    pub branch: Option<String>,
    pub domain: Option<String>,
    pub campus: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub password: Option<String>,
    pub campus: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct CampusCounts {
    pub bbsr: i64,
    pub pkd: i64,
    pub vzm: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub success: bool,
    pub students: Vec<TestRegistrant>,
    pub campus_counts: CampusCounts,
    pub total_count: usize,
}
