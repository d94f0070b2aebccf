use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Tuning for the similar-products endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationConfig {
    /// Result count used when the caller omits `limit`.
    pub default_limit: usize,
    /// Upper bound applied to caller-supplied limits.
    pub max_limit: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: crate::DEFAULT_SIMILAR_LIMIT,
            max_limit: 50,
        }
    }
}

impl RecommendationConfig {
    /// Resolve a caller-supplied limit: `None` yields the default, values
    /// above `max_limit` are clamped, and anything below 1 is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidLimit`] for zero or negative limits.
    pub fn resolve_limit(&self, requested: Option<i64>) -> Result<usize, crate::CoreError> {
        match requested {
            None => Ok(self.default_limit),
            Some(n) if n < 1 => Err(crate::CoreError::InvalidLimit(n)),
            Some(n) => Ok(usize::try_from(n).map_or(self.max_limit, |n| n.min(self.max_limit))),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub recommendations: RecommendationConfig,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("recommendations", &self.recommendations)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .finish()
    }
}
