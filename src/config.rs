use std::{fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub store_timeout: Duration,
    pub page_size: u32,
    pub max_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: "sqlite://collabhub.db".to_owned(),
            max_connections: 16,
            store_timeout: Duration::from_millis(5000),
            page_size: 50,
            max_page_size: 200,
        }
    }
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn load() -> Self {
        if dotenv::dotenv().is_err() {
            info!("no .env file, using process environment");
        }

        let defaults = Self::default();
        let config = Self {
            port: try_load("PORT", defaults.port),
            database_url: try_load("DATABASE_URL", defaults.database_url),
            max_connections: try_load("DB_MAX_CONNECTIONS", defaults.max_connections).max(1),
            store_timeout: store_timeout(try_load(
                "STORE_TIMEOUT_MS",
                defaults.store_timeout.as_millis() as u64,
            )),
            page_size: try_load("PAGE_SIZE", defaults.page_size).max(1),
            max_page_size: try_load("MAX_PAGE_SIZE", defaults.max_page_size).max(1),
        };

        if config.page_size > config.max_page_size {
            warn!(
                page_size = config.page_size,
                max_page_size = config.max_page_size,
                "PAGE_SIZE exceeds MAX_PAGE_SIZE, clamping"
            );
            return Self {
                page_size: config.max_page_size,
                ..config
            };
        }

        config
    }
}

/// Never zero: floors at one millisecond.
fn store_timeout(millis: u64) -> Duration {
    Duration::from_millis(millis.max(1))
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(raw) = dotenv::var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value `{raw}`: {e}, using default: {default}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 16);
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert!(config.page_size <= config.max_page_size);
    }

    #[test]
    fn zero_store_timeout_is_raised_to_a_millisecond() {
        assert_eq!(store_timeout(0), Duration::from_millis(1));
        assert_eq!(store_timeout(250), Duration::from_millis(250));
    }

    #[test]
    fn missing_key_falls_back_to_default() {
        let value: u32 = try_load("COLLABHUB_TEST_SURELY_UNSET_KEY", 42);
        assert_eq!(value, 42);
    }
}
