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


//! Catalog queries
//!
//! Search over books and the values derived from their associations.
//!
//! # Usage Example
//! ```no_run
//! use bookshelf_core::catalog::{BookCatalogQuery, SearchOptions};
//! use bookshelf_core::storage::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = BookCatalogQuery::new(Database::new("./catalog.db").await?);
//!
//! let options = SearchOptions::default().with_physical(true);
//! for hit in catalog.search("the", &options).await? {
//!     let author = catalog.author_name(&hit.book).await?;
//!     match hit.average_rating {
//!         Some(rating) => println!("{} by {} ({})", hit.book.title, author, rating),
//!         None => println!("{} by {} (no reviews)", hit.book.title, author),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod query;
pub mod rating;
pub mod search;
mod store;

pub use query::BookCatalogQuery;
pub use rating::{AverageRating, RatingTotals};
pub use search::{BookPredicate, RatedBook, SearchFilter, SearchOptions};
pub use store::CatalogStore;
