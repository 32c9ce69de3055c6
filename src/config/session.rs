use anyhow::Result;
use std::env;

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_TTL_SECONDS: u64 = 604_800; // 7 days
const MAX_TTL_SECONDS: u64 = 31_536_000; // 365 days

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_seconds: u64,
}

impl SessionConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable must be set"))?;

        let ttl_seconds = env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        Self::new(secret, ttl_seconds)
    }

    pub fn new(secret: impl Into<String>, ttl_seconds: u64) -> Result<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "SESSION_SECRET must be at least {MIN_SECRET_LEN} characters"
            ));
        }
        if ttl_seconds == 0 {
            return Err(anyhow::anyhow!("SESSION_TTL_SECONDS must be positive"));
        }
        if ttl_seconds > MAX_TTL_SECONDS {
            return Err(anyhow::anyhow!(
                "SESSION_TTL_SECONDS must be at most {MAX_TTL_SECONDS}, got {ttl_seconds}"
            ));
        }

        Ok(Self {
            secret,
            ttl_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_rejected() {
        assert!(SessionConfig::new("too-short", 60).is_err());
    }

    #[test]
    fn zero_ttl_rejected() {
        assert!(SessionConfig::new("x".repeat(40), 0).is_err());
    }

    #[test]
    fn ttl_above_one_year_rejected() {
        assert!(SessionConfig::new("x".repeat(40), MAX_TTL_SECONDS).is_ok());
        assert!(SessionConfig::new("x".repeat(40), MAX_TTL_SECONDS + 1).is_err());
        assert!(SessionConfig::new("x".repeat(40), u64::MAX).is_err());
    }

    #[test]
    fn valid_config_accepted() {
        let config = SessionConfig::new("x".repeat(32), 60).unwrap();
        assert_eq!(config.ttl_seconds, 60);
    }
}
