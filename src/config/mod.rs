//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Supabase project URL
    pub supabase_url: String,
    /// Supabase service role key (bypasses RLS - server only!)
    pub supabase_service_role_key: String,
    /// Table holding `username -> score` rows
    pub scores_table: String,
    /// Timeout applied to every persistence request
    pub persistence_timeout: Duration,

    /// Simulation tick period
    pub tick_interval: Duration,
    /// Horizontal extent of the spawn area
    pub spawn_width: f64,
    /// Vertical extent of the spawn area
    pub spawn_height: f64,
    /// Fixed RNG seed for spawns and colors (random when unset)
    pub world_seed: Option<u64>,

    /// Allowed client origins for CORS (comma-separated), any origin when unset
    pub client_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        };

        let tick_interval_ms: u64 = parse_or("TICK_INTERVAL_MS", 15)?;
        if tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("TICK_INTERVAL_MS"));
        }
        let spawn_width: f64 = parse_or("SPAWN_WIDTH", 1024.0)?;
        if !spawn_width.is_finite() || spawn_width <= 0.0 {
            return Err(ConfigError::Invalid("SPAWN_WIDTH"));
        }
        let spawn_height: f64 = parse_or("SPAWN_HEIGHT", 768.0)?;
        if !spawn_height.is_finite() || spawn_height <= 0.0 {
            return Err(ConfigError::Invalid("SPAWN_HEIGHT"));
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            supabase_url: env::var("SUPABASE_URL")
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?,
            scores_table: env::var("SCORES_TABLE").unwrap_or_else(|_| "players".to_string()),
            persistence_timeout: Duration::from_secs(parse_or(
                "PERSISTENCE_TIMEOUT_SECS",
                5,
            )?),

            tick_interval: Duration::from_millis(tick_interval_ms),
            spawn_width,
            spawn_height,
            world_seed: parse_optional("WORLD_SEED")?,

            client_origin: env::var("CLIENT_ORIGIN").ok(),
        })
    }
}

/// Parse an optional variable, using `default` when it is unset
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(parse_optional(name)?.unwrap_or(default))
}

fn parse_optional<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_unset_variable() {
        let value: Option<u64> = parse_optional("SHOOTER_TEST_UNSET_VARIABLE").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        env::set_var("SHOOTER_TEST_BAD_TICK", "fifteen");
        let result: Result<u64, _> = parse_or("SHOOTER_TEST_BAD_TICK", 15);
        assert!(matches!(result, Err(ConfigError::Invalid("SHOOTER_TEST_BAD_TICK"))));
    }

    #[test]
    fn test_parse_or_trims_whitespace() {
        env::set_var("SHOOTER_TEST_SPAWN", " 640 ");
        let value: f64 = parse_or("SHOOTER_TEST_SPAWN", 1024.0).unwrap();
        assert_eq!(value, 640.0);
    }
}
