//! Service configuration

use anyhow::Result;
use std::{env, str::FromStr};

/// Largest page size accepted by the listing endpoints unless overridden
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Where the service keeps its data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("Unknown storage backend: {}", other),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Storage backend
    pub storage: StorageBackend,
    /// Upper bound for the `limit` query parameter
    pub max_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            storage: StorageBackend::Postgres,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BIND_ADDRESS`: Listen address (default: "0.0.0.0:3001")
    /// - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
    /// - `MAX_PAGE_SIZE`: Largest accepted page size (default: 100)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let bind_address = env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address);

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.storage,
        };

        let max_page_size = env::var("MAX_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|size| *size > 0)
            .unwrap_or(defaults.max_page_size);

        Ok(AppConfig {
            bind_address,
            storage,
            max_page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("STORAGE_BACKEND");
            env::remove_var("MAX_PAGE_SIZE");
        }
    }

    #[test]
    #[serial]
    fn test_app_config_defaults() {
        clear();
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3001");
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.max_page_size, DEFAULT_MAX_PAGE_SIZE);
    }

    #[test]
    #[serial]
    fn test_app_config_from_env() {
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("STORAGE_BACKEND", "Memory");
            env::set_var("MAX_PAGE_SIZE", "0");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.max_page_size, DEFAULT_MAX_PAGE_SIZE);

        clear();
    }

    #[test]
    #[serial]
    fn test_unknown_backend_is_rejected() {
        unsafe {
            env::set_var("STORAGE_BACKEND", "mongodb");
        }
        assert!(AppConfig::from_env().is_err());
        clear();
    }
}
