use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub sync_cron: String,
    pub sync_on_startup: bool,
    pub snapshot_cache_ttl_secs: u64,
    /// Seed values for the options blob, only applied when nothing is stored yet.
    pub seed_api_base_url: Option<String>,
    pub seed_api_subscription_key: Option<String>,
    pub seed_api_ukprn: Option<String>,
}

impl Config {
    pub const DEFAULT_SYNC_CRON: &'static str = "0 0 3 * * *";
    pub const DEFAULT_SNAPSHOT_CACHE_TTL_SECS: u64 = 3600;

    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let storage_backend: StorageBackend =
            get_env_parse_or("STORAGE_BACKEND", StorageBackend::Postgres)?;
        let database_url = get_env_opt("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "Missing environment variable: DATABASE_URL".to_string(),
            ));
        }

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            storage_backend,
            database_url,
            sync_cron: get_env_opt("SYNC_CRON")
                .unwrap_or_else(|| Self::DEFAULT_SYNC_CRON.to_string()),
            sync_on_startup: get_env_parse_or("SYNC_ON_STARTUP", false)?,
            snapshot_cache_ttl_secs: get_env_parse_or(
                "SNAPSHOT_CACHE_TTL_SECS",
                Self::DEFAULT_SNAPSHOT_CACHE_TTL_SECS,
            )?,
            seed_api_base_url: get_env_opt("API_BASE_URL"),
            seed_api_subscription_key: get_env_opt("API_SUBSCRIPTION_KEY"),
            seed_api_ukprn: get_env_opt("API_UKPRN"),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_parses_aliases() {
        assert_eq!("Postgres".parse::<StorageBackend>(), Ok(StorageBackend::Postgres));
        assert_eq!(" mem ".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }
}
