// Runtime configuration loaded from the environment

use std::env;

/// Configuration errors raised while reading the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string; `None` runs on the in-memory store
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub jwt_duration_secs: i64,
    /// Seed the demo dataset into an empty PostgreSQL store
    pub seed_demo_data: bool,
}

impl AppConfig {
    /// Load `.env` (if present) and read the configuration
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", lookup("PORT"), 8080u16)?;

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let jwt_duration_secs = parse_or("JWT_DURATION_SECS", lookup("JWT_DURATION_SECS"), 86_400i64)?;
        if jwt_duration_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_DURATION_SECS",
                value: jwt_duration_secs.to_string(),
            });
        }

        let seed_demo_data = parse_or("SEED_DEMO_DATA", lookup("SEED_DEMO_DATA"), false)?;

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_duration_secs,
            seed_demo_data,
        })
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|_| ConfigError::Invalid { name, value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.jwt_duration_secs, 86_400);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("PORT", "9000")]));
        assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_port = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s"), ("PORT", "http")]));
        assert!(matches!(bad_port, Err(ConfigError::Invalid { name: "PORT", .. })));

        let bad_duration =
            AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s"), ("JWT_DURATION_SECS", "0")]));
        assert!(matches!(bad_duration, Err(ConfigError::Invalid { name: "JWT_DURATION_SECS", .. })));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "postgresql://shop:shop@db:5432/shop"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("SEED_DEMO_DATA", "true"),
        ]))
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgresql://shop:shop@db:5432/shop"));
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert!(config.seed_demo_data);
    }
}
