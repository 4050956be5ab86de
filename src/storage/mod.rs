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


//! Database storage and models
//!
//! This module handles all database operations using SQLite through sqlx.
//!
//! # Database Schema
//! - Books: title plus author and publisher references
//! - Authors, Publishers, BookFormatTypes: reference data
//! - BookFormats: Book <-> BookFormatType junction
//! - BookReviews: integer ratings per book
//!
//! # Usage Example
//! ```no_run
//! use bookshelf_core::storage::{Database, queries, models::{NewAuthor, NewBook, NewPublisher}};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./catalog.db").await?;
//!
//! let author_id = queries::insert_author(db.pool(), &NewAuthor::new("Ray", "Kurzweil")).await?;
//! let publisher_id = queries::insert_publisher(db.pool(), &NewPublisher::new("Viking")).await?;
//! let book_id = queries::insert_book(
//!     db.pool(),
//!     &NewBook::new("The Singularity Is Near", publisher_id, author_id),
//! )
//! .await?;
//!
//! let book = queries::find_book_by_id(db.pool(), book_id).await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

// Re-export commonly used types
pub use database::Database;
pub use models::{
    Author, Book, BookFormat, BookFormatType, BookReview, BookSearchRow, NewAuthor, NewBook,
    NewBookFormatType, NewBookReview, NewPublisher, Publisher,
};
