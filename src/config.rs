use anyhow::Context;
use serde::Deserialize;

/// Longest accepted token lifetime: one year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

/// How `/auth/validate` treats a presented bearer token.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenValidation {
    /// Check signature, expiry, issuer and audience.
    Verify,
    /// Legacy behavior: only require a non-empty `Bearer` header.
    Presence,
}

impl std::str::FromStr for TokenValidation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verify" => Ok(Self::Verify),
            "presence" => Ok(Self::Presence),
            other => anyhow::bail!("unknown TOKEN_VALIDATION `{other}` (verify or presence)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub validation: TokenValidation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source. Missing optional keys fall
    /// back to defaults; present but unparsable values are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{key} must be set"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let database_url = required("DATABASE_URL")?;
        let host = or_default("APP_HOST", "0.0.0.0");
        let port = or_default("APP_PORT", "8080")
            .parse::<u16>()
            .context("APP_PORT must be a port number")?;
        let db_max_connections = or_default("DB_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a positive integer")?;

        let ttl_minutes = or_default("JWT_TTL_MINUTES", "60")
            .parse::<i64>()
            .context("JWT_TTL_MINUTES must be an integer")?;
        anyhow::ensure!(ttl_minutes > 0, "JWT_TTL_MINUTES must be positive");
        anyhow::ensure!(
            ttl_minutes <= MAX_TTL_MINUTES,
            "JWT_TTL_MINUTES must be at most {MAX_TTL_MINUTES}"
        );

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: or_default("JWT_ISSUER", "authsvc"),
            audience: or_default("JWT_AUDIENCE", "authsvc-clients"),
            ttl_minutes,
            validation: or_default("TOKEN_VALIDATION", "verify").parse()?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            jwt,
        })
    }
}
