use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::{macros::format_description, Duration, OffsetDateTime};

/// Attendance tokens expire 12 hours after issuance. SQLite has no TTL
/// index, so expired rows are purged on session start and ignored on lookup.
pub const TOKEN_TTL: Duration = Duration::hours(12);

pub const STATUS_PRESENT: &str = "present";
pub const STATUS_HALF_DAY: &str = "half-day";

/// Day bucket stamped at check-in and keyed on by the batch correction.
/// UTC date, `YYYY-MM-DD`.
pub fn day_bucket(at: OffsetDateTime) -> String {
    at.date()
        .format(format_description!("[year]-[month]-[day]"))
        .expect("date formats")
}

pub fn today_bucket() -> String {
    day_bucket(OffsetDateTime::now_utc())
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub test_user_id: i64,
    pub date: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub check_in_time: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub check_out_time: Option<OffsetDateTime>,
    pub status: String,
}

impl AttendanceRecord {
    /// Most recent days first, at most `limit` rows.
    pub async fn history(
        db: &SqlitePool,
        test_user_id: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, test_user_id, date, check_in_time, check_out_time, status
            FROM attendance_records
            WHERE test_user_id = $1
            ORDER BY date DESC
            LIMIT $2
            "#,
        )
        .bind(test_user_id)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_for_day(
        db: &SqlitePool,
        test_user_id: i64,
        date: &str,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        let row = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, test_user_id, date, check_in_time, check_out_time, status
            FROM attendance_records
            WHERE test_user_id = $1 AND date = $2
            "#,
        )
        .bind(test_user_id)
        .bind(date)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn check_in(
        db: &SqlitePool,
        test_user_id: i64,
        date: &str,
        at: OffsetDateTime,
    ) -> anyhow::Result<AttendanceRecord> {
        let row = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_records (test_user_id, date, check_in_time, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, test_user_id, date, check_in_time, check_out_time, status
            "#,
        )
        .bind(test_user_id)
        .bind(date)
        .bind(at)
        .bind(STATUS_PRESENT)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Closes the day's open record; returns how many rows changed (0 when
    /// there was no open check-in).
    pub async fn check_out(
        db: &SqlitePool,
        test_user_id: i64,
        date: &str,
        at: OffsetDateTime,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET check_out_time = $1
            WHERE test_user_id = $2 AND date = $3 AND check_out_time IS NULL
            "#,
        )
        .bind(at)
        .bind(test_user_id)
        .bind(date)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    /// Bulk correction: checked in on `date`, never checked out, still
    /// "present" — demoted to "half-day" in one statement.
    pub async fn close_pending_checkouts(db: &SqlitePool, date: &str) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET status = $1
            WHERE date = $2
              AND check_in_time IS NOT NULL
              AND check_out_time IS NULL
              AND status = $3
            "#,
        )
        .bind(STATUS_HALF_DAY)
        .bind(date)
        .bind(STATUS_PRESENT)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceToken {
    pub id: i64,
    pub email: String,
    pub test_user_id: i64,
    pub token: String,
    pub salt: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active: OffsetDateTime,
    pub is_active: bool,
}

impl AttendanceToken {
    pub async fn purge_expired(db: &SqlitePool, now: OffsetDateTime) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM attendance_tokens WHERE created_at < $1")
            .bind(now - TOKEN_TTL)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// One active token per email: replaces any previous session in place.
    pub async fn upsert(
        db: &SqlitePool,
        email: &str,
        test_user_id: i64,
        token: &str,
        salt: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<AttendanceToken> {
        let row = sqlx::query_as::<_, AttendanceToken>(
            r#"
            INSERT INTO attendance_tokens
                (email, test_user_id, token, salt, created_at, last_active, is_active)
            VALUES ($1, $2, $3, $4, $5, $5, 1)
            ON CONFLICT(email) DO UPDATE SET
                test_user_id = excluded.test_user_id,
                token = excluded.token,
                salt = excluded.salt,
                created_at = excluded.created_at,
                last_active = excluded.last_active,
                is_active = 1
            RETURNING id, email, test_user_id, token, salt, created_at, last_active, is_active
            "#,
        )
        .bind(email)
        .bind(test_user_id)
        .bind(token)
        .bind(salt)
        .bind(now)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn find_active(
        db: &SqlitePool,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<AttendanceToken>> {
        let row = sqlx::query_as::<_, AttendanceToken>(
            r#"
            SELECT id, email, test_user_id, token, salt, created_at, last_active, is_active
            FROM attendance_tokens
            WHERE token = $1 AND is_active = 1 AND created_at >= $2
            "#,
        )
        .bind(token)
        .bind(now - TOKEN_TTL)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn touch(db: &SqlitePool, id: i64, now: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query("UPDATE attendance_tokens SET last_active = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSettings {
    #[serde(skip_serializing)]
    pub id: i64,
    pub geo_location_enabled: bool,
    pub default_radius: f64,
    pub max_qr_validity_seconds: i64,
    pub multi_device_limit: i64,
    pub require_check_out: bool,
    pub updated_by: String,
}

impl AttendanceSettings {
    /// Singleton row, lazily created with defaults on first read.
    pub async fn load_or_init(db: &SqlitePool) -> anyhow::Result<AttendanceSettings> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO attendance_settings
                (id, geo_location_enabled, default_radius, max_qr_validity_seconds,
                 multi_device_limit, require_check_out, updated_by)
            VALUES (1, 0, 100.0, 30, 1, 1, 'system')
            "#,
        )
        .execute(db)
        .await?;

        let row = sqlx::query_as::<_, AttendanceSettings>(
            r#"
            SELECT id, geo_location_enabled, default_radius, max_qr_validity_seconds,
                   multi_device_limit, require_check_out, updated_by
            FROM attendance_settings
            WHERE id = 1
            "#,
        )
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn save(&self, db: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE attendance_settings
            SET geo_location_enabled = $1,
                default_radius = $2,
                max_qr_validity_seconds = $3,
                multi_device_limit = $4,
                require_check_out = $5,
                updated_by = $6
            WHERE id = 1
            "#,
        )
        .bind(self.geo_location_enabled)
        .bind(self.default_radius)
        .bind(self.max_qr_validity_seconds)
        .bind(self.multi_device_limit)
        .bind(self.require_check_out)
        .bind(&self.updated_by)
        .execute(db)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CampusLocation {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub enabled: bool,
    pub updated_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CampusLocation {
    pub async fn list(db: &SqlitePool) -> anyhow::Result<Vec<CampusLocation>> {
        let rows = sqlx::query_as::<_, CampusLocation>(
            r#"
            SELECT id, name, latitude, longitude, radius, enabled, updated_by, updated_at
            FROM campus_locations
            ORDER BY name
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        db: &SqlitePool,
        name: &str,
        latitude: f64,
        longitude: f64,
        radius: f64,
        enabled: bool,
        updated_by: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<CampusLocation> {
        let row = sqlx::query_as::<_, CampusLocation>(
            r#"
            INSERT INTO campus_locations
                (name, latitude, longitude, radius, enabled, updated_by, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(name) DO UPDATE SET
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                radius = excluded.radius,
                enabled = excluded.enabled,
                updated_by = excluded.updated_by,
                updated_at = excluded.updated_at
            RETURNING id, name, latitude, longitude, radius, enabled, updated_by, updated_at
            "#,
        )
        .bind(name)
        .bind(latitude)
        .bind(longitude)
        .bind(radius)
        .bind(enabled)
        .bind(updated_by)
        .bind(now)
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bucket_is_iso_date() {
        let at = time::macros::datetime!(2026-02-03 23:59:00 UTC);
        assert_eq!(day_bucket(at), "2026-02-03");
    }
}
