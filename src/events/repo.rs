use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRegistration {
    pub id: i64,
    #[serde(rename = "userid")]
    pub user_id: i64,
    pub eventid: String,
    pub eventname: String,
    pub ticketid: String,
    pub email: String,
    pub iszentrone: bool,
}

/// One registration joined with its owning user, for the enumeration route.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationWithUser {
    pub id: i64,
    pub user_id: i64,
    pub eventid: String,
    pub eventname: String,
    pub ticketid: String,
    pub email: String,
    pub iszentrone: bool,
    pub user_email: String,
}

impl EventRegistration {
    pub async fn find_by_email_and_event(
        db: &SqlitePool,
        email: &str,
        eventname: &str,
    ) -> anyhow::Result<Option<EventRegistration>> {
        let row = sqlx::query_as::<_, EventRegistration>(
            r#"
            SELECT id, user_id, eventid, eventname, ticketid, email, iszentrone
            FROM event_registrations
            WHERE email = $1 AND eventname = $2
            "#,
        )
        .bind(email)
        .bind(eventname)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        eventid: &str,
        eventname: &str,
        ticketid: &str,
        email: &str,
        iszentrone: bool,
    ) -> anyhow::Result<EventRegistration> {
        let row = sqlx::query_as::<_, EventRegistration>(
            r#"
            INSERT INTO event_registrations (user_id, eventid, eventname, ticketid, email, iszentrone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, eventid, eventname, ticketid, email, iszentrone
            "#,
        )
        .bind(user_id)
        .bind(eventid)
        .bind(eventname)
        .bind(ticketid)
        .bind(email)
        .bind(iszentrone)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Full-table read with the owning user populated. Intended for small
    /// volumes only; there is deliberately no pagination.
    pub async fn list_with_users(db: &SqlitePool) -> anyhow::Result<Vec<RegistrationWithUser>> {
        let rows = sqlx::query_as::<_, RegistrationWithUser>(
            r#"
            SELECT er.id, er.user_id, er.eventid, er.eventname, er.ticketid,
                   er.email, er.iszentrone, u.email AS user_email
            FROM event_registrations er
            JOIN users u ON u.id = er.user_id
            ORDER BY er.id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
