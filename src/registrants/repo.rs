use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

pub const KNOWN_CAMPUSES: [&str; 3] = ["bbsr", "pkd", "vzm"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestRegistrant {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub regno: String,
    pub phone: String,
    pub branch: String,
    pub domain: Option<String>,
    pub campus: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct CampusCount {
    pub campus: String,
    pub count: i64,
}

pub struct NewRegistrant<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub regno: &'a str,
    pub phone: &'a str,
    pub branch: &'a str,
    pub domain: Option<&'a str>,
    pub campus: Option<&'a str>,
}

impl TestRegistrant {
    pub async fn find_by_email(
        db: &SqlitePool,
        email: &str,
    ) -> anyhow::Result<Option<TestRegistrant>> {
        let row = sqlx::query_as::<_, TestRegistrant>(
            r#"
            SELECT id, name, email, regno, phone, branch, domain, campus, created_at
            FROM test_registrants
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn create(db: &SqlitePool, new: NewRegistrant<'_>) -> anyhow::Result<TestRegistrant> {
        let row = sqlx::query_as::<_, TestRegistrant>(
            r#"
            INSERT INTO test_registrants (name, email, regno, phone, branch, domain, campus, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, email, regno, phone, branch, domain, campus, created_at
            "#,
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.regno)
        .bind(new.phone)
        .bind(new.branch)
        .bind(new.domain)
        .bind(new.campus)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Roster listing, sorted by name. `campus` filters case-insensitively;
    /// `None` (or "all" upstream) returns everyone.
    pub async fn list(
        db: &SqlitePool,
        campus: Option<&str>,
    ) -> anyhow::Result<Vec<TestRegistrant>> {
        let rows = match campus {
            Some(c) => {
                sqlx::query_as::<_, TestRegistrant>(
                    r#"
                    SELECT id, name, email, regno, phone, branch, domain, campus, created_at
                    FROM test_registrants
                    WHERE LOWER(campus) = LOWER($1)
                    ORDER BY name
                    "#,
                )
                .bind(c)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, TestRegistrant>(
                    r#"
                    SELECT id, name, email, regno, phone, branch, domain, campus, created_at
                    FROM test_registrants
                    ORDER BY name
                    "#,
                )
                .fetch_all(db)
                .await?
            }
        };
        Ok(rows)
    }

    /// Per-campus totals over the whole table, case-folded. Unknown campus
    /// values come back too; the handler keeps only the known three.
    pub async fn campus_counts(db: &SqlitePool) -> anyhow::Result<Vec<CampusCount>> {
        let rows = sqlx::query_as::<_, CampusCount>(
            r#"
            SELECT LOWER(campus) AS campus, COUNT(*) AS count
            FROM test_registrants
            WHERE campus IS NOT NULL
            GROUP BY LOWER(campus)
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
