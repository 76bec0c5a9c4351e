use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use tracing::info;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

/// How the admin password is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminPassword {
    /// Argon2 PHC string.
    Hash(String),
    /// Hashed once at startup.
    Plain(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password: AdminPassword,
    pub notify_webhook: Option<String>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("SEDP_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SEDP_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let admin_password = match (var("SEDP_ADMIN_PASSWORD_HASH"), var("SEDP_ADMIN_PASSWORD")) {
            (Some(hash), _) => AdminPassword::Hash(hash),
            (None, Some(plain)) => AdminPassword::Plain(plain),
            (None, None) => {
                bail!("Set SEDP_ADMIN_PASSWORD_HASH (preferred) or SEDP_ADMIN_PASSWORD")
            }
        };

        Ok(Self {
            host: or_default(&var, "SEDP_HOST", "0.0.0.0"),
            port: parse_or(&var, "SEDP_PORT", 3000)?,
            db_path: or_default(&var, "SEDP_DB_PATH", "sedp.db").into(),
            jwt_secret,
            admin_username: or_default(&var, "SEDP_ADMIN_USERNAME", "admin"),
            admin_password,
            notify_webhook: var("SEDP_NOTIFY_WEBHOOK"),
        })
    }
}

fn or_default(var: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {key} value '{raw}'")),
        None => Ok(default),
    }
}
