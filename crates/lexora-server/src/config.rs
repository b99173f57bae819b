use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use tracing::warn;

/// Placeholder JWT secrets that MUST NOT be used outside development.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

const DEV_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub token_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), cfg!(debug_assertions))
    }

    /// `allow_dev_secret` lets debug builds start without a real secret.
    pub fn from_lookup<F>(get: F, allow_dev_secret: bool) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = get("LEXORA_JWT_SECRET").unwrap_or_default();
        let jwt_secret = if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            if !allow_dev_secret {
                bail!("LEXORA_JWT_SECRET is unset or still a placeholder");
            }
            warn!("LEXORA_JWT_SECRET unset; using the development secret");
            DEV_SECRET.to_string()
        } else {
            jwt_secret
        };

        let port = match get("LEXORA_PORT") {
            Some(raw) => raw.parse().with_context(|| format!("LEXORA_PORT '{}'", raw))?,
            None => 5001,
        };
        let token_ttl_days = match get("LEXORA_TOKEN_TTL_DAYS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("LEXORA_TOKEN_TTL_DAYS '{}'", raw))?,
            None => 30,
        };
        if token_ttl_days <= 0 {
            bail!("LEXORA_TOKEN_TTL_DAYS must be positive");
        }

        Ok(Self {
            jwt_secret,
            db_path: get("LEXORA_DB_PATH").unwrap_or_else(|| "lexora.db".into()).into(),
            host: get("LEXORA_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            token_ttl_days,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().with_context(|| format!("listen address '{}'", addr))
    }
}
