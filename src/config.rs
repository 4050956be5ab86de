// Bookshelf - Book Catalog Core
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Centralized configuration (environment variables + defaults).
//!
//! | Variable | Default |
//! |---|---|
//! | `BOOKSHELF_DATABASE_PATH` | [`Database::get_default_path`] |
//! | `BOOKSHELF_MAX_CONNECTIONS` | 5 |
//! | `BOOKSHELF_BUSY_TIMEOUT_SECS` | 30 |
//! | `BOOKSHELF_LOG` | `info` |

use crate::error::{CatalogError, Result};
use crate::storage::Database;
use std::path::PathBuf;
use std::time::Duration;

pub const DATABASE_PATH_VAR: &str = "BOOKSHELF_DATABASE_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "BOOKSHELF_MAX_CONNECTIONS";
pub const BUSY_TIMEOUT_VAR: &str = "BOOKSHELF_BUSY_TIMEOUT_SECS";
pub const LOG_FILTER_VAR: &str = "BOOKSHELF_LOG";

/// Runtime settings for opening the catalog database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// SQLite file location
    pub database_path: PathBuf,
    /// Pool size
    pub max_connections: u32,
    /// How long a connection waits on a locked database
    pub busy_timeout: Duration,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: Database::get_default_path(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(30),
            log_filter: "info".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Missing keys fall back to defaults; present but unparsable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DATABASE_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            let max = parse_number::<u32>(MAX_CONNECTIONS_VAR, &raw)?;
            if max == 0 {
                return Err(CatalogError::ConfigurationError(format!(
                    "{} must be at least 1",
                    MAX_CONNECTIONS_VAR
                )));
            }
            config.max_connections = max;
        }

        if let Some(raw) = lookup(BUSY_TIMEOUT_VAR) {
            config.busy_timeout = Duration::from_secs(parse_number::<u64>(BUSY_TIMEOUT_VAR, &raw)?);
        }

        if let Some(filter) = lookup(LOG_FILTER_VAR).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        CatalogError::ConfigurationError(format!("{} must be a number, got '{}'", key, raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CatalogConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_overrides() {
        let config = CatalogConfig::from_lookup(lookup_from(&[
            (DATABASE_PATH_VAR, "/tmp/shelf.db"),
            (MAX_CONNECTIONS_VAR, "2"),
            (BUSY_TIMEOUT_VAR, "5"),
            (LOG_FILTER_VAR, "bookshelf_core=debug"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/shelf.db"));
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert_eq!(config.log_filter, "bookshelf_core=debug");
    }

    #[test]
    fn test_bad_number_is_configuration_error() {
        let err = CatalogConfig::from_lookup(lookup_from(&[(MAX_CONNECTIONS_VAR, "many")]))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(_)));

        let err = CatalogConfig::from_lookup(lookup_from(&[(MAX_CONNECTIONS_VAR, "0")]))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(_)));
    }
}
