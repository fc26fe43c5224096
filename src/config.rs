use std::env;

use crate::models::Viewport;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub headless: bool,
    pub viewport: Viewport,
    /// Page opened at startup, if any
    pub start_url: Option<String>,
    pub mark_attempts: u32,
    pub mark_retry_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub load_timeout_ms: u64,
    /// Seeded marker colors instead of random ones
    pub mark_seed: Option<u32>,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parse_var("PORT").unwrap_or(defaults.port),
            host: env::var("HOST").unwrap_or(defaults.host),
            headless: env::var("HEADLESS")
                .ok()
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.headless),
            viewport: Viewport {
                width: parse_var("VIEWPORT_WIDTH").unwrap_or(defaults.viewport.width),
                height: parse_var("VIEWPORT_HEIGHT").unwrap_or(defaults.viewport.height),
            },
            start_url: env::var("START_URL").ok().filter(|u| !u.trim().is_empty()),
            mark_attempts: parse_var("MARK_ATTEMPTS").unwrap_or(defaults.mark_attempts),
            mark_retry_delay_ms: parse_var("MARK_RETRY_DELAY_MS").unwrap_or(defaults.mark_retry_delay_ms),
            settle_delay_ms: parse_var("SETTLE_DELAY_MS").unwrap_or(defaults.settle_delay_ms),
            load_timeout_ms: parse_var("LOAD_TIMEOUT_MS").unwrap_or(defaults.load_timeout_ms),
            mark_seed: parse_var("MARK_SEED"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8766,
            host: "127.0.0.1".to_string(),
            headless: true,
            viewport: Viewport::default(),
            start_url: None,
            mark_attempts: 10,
            mark_retry_delay_ms: 5000,
            settle_delay_ms: 0,
            load_timeout_ms: 30_000,
            mark_seed: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" YES "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8766);
        assert_eq!(config.viewport, Viewport { width: 1920, height: 1080 });
        assert_eq!(config.mark_attempts, 10);
        assert!(config.headless);
        assert!(config.mark_seed.is_none());
    }
}
