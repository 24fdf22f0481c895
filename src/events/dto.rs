use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ClaimQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PopulatedUser {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct PopulatedRegistration {
    pub id: i64,
    pub eventid: String,
    pub eventname: String,
    pub ticketid: String,
    pub email: String,
    pub iszentrone: bool,
    pub user: PopulatedUser,
}
