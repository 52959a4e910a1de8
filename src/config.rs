use anyhow::Context;
use serde::Deserialize;
use time::{macros::format_description, Date, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    /// Upper bound on live in-process sessions.
    pub max_entries: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    /// Public origin used to build the table QR links.
    pub base_url: String,
    pub total_tables: u32,
    /// Offset of the restaurant's wall clock; decides what "today" is.
    pub utc_offset: UtcOffset,
    pub seed_password: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let session = SessionConfig {
            secret: std::env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "nosty".into()),
            audience: std::env::var("SESSION_AUDIENCE").unwrap_or_else(|_| "nosty-web".into()),
            ttl_minutes: env_or("SESSION_TTL_MINUTES", 12 * 60),
            max_entries: env_or("SESSION_MAX_ENTRIES", 100_000),
        };
        let utc_offset = match std::env::var("BUSINESS_UTC_OFFSET") {
            Ok(raw) => parse_offset(&raw)?,
            Err(_) => UtcOffset::from_hms(7, 0, 0)?,
        };
        let port: u16 = env_or("APP_PORT", 8080);

        Ok(Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            total_tables: env_or("TOTAL_TABLES", 20),
            utc_offset,
            seed_password: std::env::var("SEED_PASSWORD").unwrap_or_else(|_| "admin123".into()),
            session,
        })
    }

    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.utc_offset)
    }

    pub fn today(&self) -> Date {
        self.now().date()
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Accepts `+07:00` / `-03:30` style offsets.
pub fn parse_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    UtcOffset::parse(
        raw.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("invalid BUSINESS_UTC_OFFSET {raw:?}"))
}
