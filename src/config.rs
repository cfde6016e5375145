use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "erp_finance.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Runtime settings read from the environment (and an optional `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `ERP_FINANCE_DB`
    pub database_path: PathBuf,
    /// `ERP_FINANCE_ADDR`, used by the API server only
    pub bind_addr: String,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            database_path: non_empty("ERP_FINANCE_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            bind_addr: non_empty("ERP_FINANCE_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}
