//! Database models for the book catalog
//!
//! Row types for every table plus the `New*` records used for inserts.
//!
//! # SQLite Adaptations
//! - Booleans stored as INTEGER 0/1
//! - DateTime stored as TEXT (`CURRENT_TIMESTAMP` format)
//! - Book <-> BookFormatType many-to-many uses the BookFormats junction table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// REFERENCE DATA
// ============================================================================

/// Book author
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Author {
    pub author_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// Name in "last, first" form, as shown in catalog listings
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Book publisher
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Publisher {
    pub publisher_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Format a book can be had in (Hardcover, PDF, Kindle, ...)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BookFormatType {
    pub book_format_type_id: i64,
    pub name: String,
    /// Tangible format (hardcover, paperback) as opposed to digital
    pub physical: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// MAIN ENTITIES
// ============================================================================

/// Book entity
///
/// Belongs to one Author and one Publisher; has many BookFormats (and through
/// them BookFormatTypes) and many BookReviews.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Book {
    /// Primary key (auto-increment, so also creation order)
    pub book_id: i64,
    pub title: String,
    pub publisher_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book joined with the credited names a text search compares against
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BookSearchRow {
    #[sqlx(flatten)]
    pub book: Book,
    pub author_last_name: String,
    pub publisher_name: String,
}

/// Review left for a book
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BookReview {
    pub book_review_id: i64,
    pub book_id: i64,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// JUNCTION TABLES (Many-to-Many Relationships)
// ============================================================================

/// BookFormat - junction table for Book <-> BookFormatType
///
/// Surrogate primary key; the same pair may be linked more than once.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BookFormat {
    pub book_format_id: i64,
    pub book_id: i64,
    pub book_format_type_id: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// NEW RECORD STRUCTS (for inserts)
// ============================================================================

/// New author record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
}

impl NewAuthor {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// New publisher record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPublisher {
    pub name: String,
}

impl NewPublisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// New format type record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookFormatType {
    pub name: String,
    pub physical: bool,
}

impl NewBookFormatType {
    pub fn new(name: impl Into<String>, physical: bool) -> Self {
        Self {
            name: name.into(),
            physical,
        }
    }
}

/// New book record for insertion
///
/// References are optional here so that a missing one can be reported by
/// validation instead of being impossible to express.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub publisher_id: Option<i64>,
    pub author_id: Option<i64>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, publisher_id: i64, author_id: i64) -> Self {
        Self {
            title: title.into(),
            publisher_id: Some(publisher_id),
            author_id: Some(author_id),
        }
    }

    /// Presence checks that need no database access
    ///
    /// Returns one message per failed check; empty when the record is complete.
    pub fn presence_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("Title can't be blank".to_string());
        }
        if self.publisher_id.is_none() {
            errors.push("Publisher can't be blank".to_string());
        }
        if self.author_id.is_none() {
            errors.push("Author can't be blank".to_string());
        }
        errors
    }
}

/// New review record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookReview {
    pub book_id: i64,
    pub rating: i64,
}

impl NewBookReview {
    pub fn new(book_id: i64, rating: i64) -> Self {
        Self { book_id, rating }
    }
}
