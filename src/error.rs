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


//! Error types for the book catalog
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are grouped by where they come from (validation, lookups, storage,
//! configuration).
//!
//! ## What is NOT an error
//! - A search with no matches returns an empty `Vec`
//! - A search filtering on a format type that doesn't exist returns an empty `Vec`
//! - `average_rating` on a book without reviews returns `None`

use thiserror::Error;

/// Result type alias using our CatalogError type
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    // ===== Validation Errors =====

    /// Book failed validation before being persisted
    #[error("Validation failed with {error_count} errors: {}", errors.join("; "))]
    Validation {
        error_count: usize,
        /// Individual validation error messages
        errors: Vec<String>,
    },

    // ===== Lookup Errors =====

    /// A row required by the operation is missing
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    // ===== Database Errors =====

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Filesystem error while preparing the database location
    #[error("File I/O error: {0}")]
    FileIoError(String),

    // ===== Configuration/State Errors =====

    /// Configuration value is missing or unparsable
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Application state is invalid for the requested operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ===== External Library Errors =====

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

// Helper methods for creating common errors
impl CatalogError {
    /// Create a RecordNotFound error with a resource name
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        CatalogError::RecordNotFound(resource.into())
    }

    /// Create a Validation error from collected messages
    pub fn validation(errors: Vec<String>) -> Self {
        CatalogError::Validation {
            error_count: errors.len(),
            errors,
        }
    }

    /// Check if error was raised by validation (bad input won't improve on retry)
    pub fn is_validation_error(&self) -> bool {
        matches!(self, CatalogError::Validation { .. })
    }

    /// Check if error came from the underlying store
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            CatalogError::SqlxError(_)
                | CatalogError::MigrationFailed(_)
                | CatalogError::FileIoError(_)
        )
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Validation { error_count, errors } => {
                let error_list = errors
                    .iter()
                    .map(|e| format!("  - {}", e))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("Book could not be saved ({} errors):\n{}", error_count, error_list)
            }
            CatalogError::RecordNotFound(what) => format!("{} does not exist.", what),
            CatalogError::ConfigurationError(message) => {
                format!("Invalid configuration: {}. Check your BOOKSHELF_* environment variables.", message)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_counts_errors() {
        let err = CatalogError::validation(vec![
            "Title can't be blank".to_string(),
            "Author must exist".to_string(),
        ]);

        assert!(err.is_validation_error());
        assert!(!err.is_storage_error());
        assert_eq!(
            err.to_string(),
            "Validation failed with 2 errors: Title can't be blank; Author must exist"
        );
        assert!(err.user_message().contains("  - Author must exist"));
    }

    #[test]
    fn test_sqlx_error_is_storage_error() {
        let err: CatalogError = sqlx::Error::RowNotFound.into();
        assert!(err.is_storage_error());
        assert!(!err.is_validation_error());
    }

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::not_found("Author 7 of book 3");
        assert!(!err.is_storage_error());
        assert_eq!(err.user_message(), "Author 7 of book 3 does not exist.");
    }
}
