use chrono::{FixedOffset, Offset, Utc};
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::services::request_repository::TransitionPolicy;

#[derive(Clone, Debug)]
pub struct Config {
    /// `None` runs against the in-memory stores.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub bcrypt_cost: u32,
    pub bind_addr: SocketAddr,
    pub transition_policy: TransitionPolicy,
    /// Offset used when rendering `created_at` on the dashboard and in exports.
    pub display_offset: FixedOffset,
    pub log_dir: PathBuf,
}

/// Upper bound for `TOKEN_TTL_SECS`: ten years.
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

impl Config {
    /// Load environment variables and set defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any name -> value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let strict: bool = parse_var(&lookup, "STRICT_TRANSITIONS", false)?;

        let offset_minutes: i32 = parse_var(&lookup, "DISPLAY_UTC_OFFSET_MINUTES", 0)?;
        let display_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                name: "DISPLAY_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
            })?;

        let token_ttl_secs: u64 = parse_var(&lookup, "TOKEN_TTL_SECS", 36_000)?;
        if token_ttl_secs == 0 || token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                value: token_ttl_secs.to_string(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            db_max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_var(&lookup, "RUN_MIGRATIONS", true)?,
            jwt_secret,
            token_ttl_secs,
            bcrypt_cost: parse_var(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            bind_addr: parse_var(&lookup, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            transition_policy: if strict {
                TransitionPolicy::Strict
            } else {
                TransitionPolicy::Permissive
            },
            display_offset,
            log_dir: PathBuf::from(lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string())),
        })
    }

    /// Settings for tests and local runs without a database.
    pub fn for_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            db_max_connections: 1,
            run_migrations: false,
            jwt_secret: jwt_secret.into(),
            token_ttl_secs: 3_600,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            transition_policy: TransitionPolicy::Permissive,
            display_offset: Utc.fix(),
            log_dir: PathBuf::from("logs"),
        }
    }
}
