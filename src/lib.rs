//! Book catalog core
//!
//! Books with their authors, publishers, formats and reviews, stored in SQLite,
//! and the catalog queries over them.

pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;

pub use catalog::{AverageRating, BookCatalogQuery, CatalogStore, RatedBook, SearchOptions};
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used.
pub fn init_logging(default_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| CatalogError::InvalidState(format!("Logging already initialized: {}", e)))
}
