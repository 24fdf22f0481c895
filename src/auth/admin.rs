use crate::{config::AppConfig, error::ApiError};

/// Password gate for admin routes. Stateless; must run before any store
/// access so a bad password never reaches the database.
pub fn verify_admin(config: &AppConfig, submitted: Option<&str>) -> Result<(), ApiError> {
    let secret = match config.admin_password.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => return Err(ApiError::Misconfigured),
    };
    match submitted {
        Some(p) if p == secret => Ok(()),
        _ => Err(ApiError::unauthorized("Invalid password")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn config(admin_password: Option<&str>) -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            admin_password: admin_password.map(Into::into),
            jwt: JwtConfig {
                secret: "s".into(),
                issuer: "i".into(),
                audience: "a".into(),
                ttl_hours: 24,
            },
        }
    }

    #[test]
    fn accepts_exact_match() {
        assert!(verify_admin(&config(Some("hunter2")), Some("hunter2")).is_ok());
    }

    #[test]
    fn rejects_mismatch_and_missing() {
        let cfg = config(Some("hunter2"));
        assert!(matches!(
            verify_admin(&cfg, Some("wrong")),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            verify_admin(&cfg, None),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn unset_secret_is_a_server_error() {
        assert!(matches!(
            verify_admin(&config(None), Some("anything")),
            Err(ApiError::Misconfigured)
        ));
    }
}
