use anyhow::Result;
use std::env;
use std::fmt;

/// Deployment environment. Required at startup; anything else aborts boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Result<Self> {
        let raw = env::var("APP_ENV")
            .map_err(|_| anyhow::anyhow!("APP_ENV environment variable must be set"))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(anyhow::anyhow!(
                "APP_ENV must be 'development' or 'production', got '{}'",
                other
            )),
        }
    }

    /// Like `from_env`, but falls back to development when unset or invalid.
    /// Used by lazily-initialized helpers that run after startup validation.
    pub fn current() -> Self {
        Self::from_env().unwrap_or(Self::Development)
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}
