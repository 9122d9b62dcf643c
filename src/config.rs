use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Administrator account created on startup when no user owns the email yet.
#[derive(Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "user-accounts".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "user-accounts-clients".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let bootstrap_admin = bootstrap_admin_from(
            std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        )?;
        Ok(Self {
            database_url,
            database_max_connections,
            jwt,
            bootstrap_admin,
        })
    }
}

fn bootstrap_admin_from(
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<Option<BootstrapAdmin>> {
    match (email, password) {
        (Some(email), Some(password)) => Ok(Some(BootstrapAdmin { email, password })),
        (None, None) => Ok(None),
        _ => anyhow::bail!(
            "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_admin_requires_both_values() {
        assert!(bootstrap_admin_from(None, None).unwrap().is_none());
        let admin = bootstrap_admin_from(Some("root@example.com".into()), Some("s3cret!".into()))
            .unwrap()
            .expect("admin configured");
        assert_eq!(admin.email, "root@example.com");
        assert!(bootstrap_admin_from(Some("root@example.com".into()), None).is_err());
        assert!(bootstrap_admin_from(None, Some("s3cret!".into())).is_err());
    }

    #[test]
    fn bootstrap_admin_debug_hides_password() {
        let admin = BootstrapAdmin {
            email: "root@example.com".into(),
            password: "hunter22".into(),
        };
        let out = format!("{:?}", admin);
        assert!(out.contains("root@example.com"));
        assert!(!out.contains("hunter22"));
    }
}
