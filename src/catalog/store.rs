//! Data-access capability the catalog reads through
//!
//! [`BookCatalogQuery`](crate::catalog::BookCatalogQuery) never touches a pool
//! directly; it is handed a `CatalogStore` at construction. [`Database`] is the
//! SQLite implementation.

use crate::catalog::rating::RatingTotals;
use crate::catalog::search::SearchFilter;
use crate::error::Result;
use crate::storage::models::{Author, Book, BookFormatType, BookReview, NewBook, Publisher};
use crate::storage::{queries, Database};
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Books satisfying every predicate of the filter, each once, in creation order
    async fn find_books(&self, filter: &SearchFilter) -> Result<Vec<Book>>;

    async fn find_author(&self, author_id: i64) -> Result<Option<Author>>;

    async fn find_publisher(&self, publisher_id: i64) -> Result<Option<Publisher>>;

    /// Distinct format types reachable through the book's format links
    async fn format_types_for_book(&self, book_id: i64) -> Result<Vec<BookFormatType>>;

    async fn reviews_for_book(&self, book_id: i64) -> Result<Vec<BookReview>>;

    /// Rating totals for many books at once; unreviewed books are left out
    async fn rating_totals(&self, book_ids: &[i64]) -> Result<HashMap<i64, RatingTotals>>;

    async fn author_exists(&self, author_id: i64) -> Result<bool>;

    async fn publisher_exists(&self, publisher_id: i64) -> Result<bool>;

    /// Persist a book that has already been validated
    async fn insert_book(&self, book: &NewBook) -> Result<i64>;
}

#[async_trait]
impl CatalogStore for Database {
    async fn find_books(&self, filter: &SearchFilter) -> Result<Vec<Book>> {
        queries::search_books(self.pool(), filter).await
    }

    async fn find_author(&self, author_id: i64) -> Result<Option<Author>> {
        queries::find_author_by_id(self.pool(), author_id).await
    }

    async fn find_publisher(&self, publisher_id: i64) -> Result<Option<Publisher>> {
        queries::find_publisher_by_id(self.pool(), publisher_id).await
    }

    async fn format_types_for_book(&self, book_id: i64) -> Result<Vec<BookFormatType>> {
        queries::find_format_types_by_book(self.pool(), book_id).await
    }

    async fn reviews_for_book(&self, book_id: i64) -> Result<Vec<BookReview>> {
        queries::find_reviews_by_book(self.pool(), book_id).await
    }

    async fn rating_totals(&self, book_ids: &[i64]) -> Result<HashMap<i64, RatingTotals>> {
        queries::rating_totals_for_books(self.pool(), book_ids).await
    }

    async fn author_exists(&self, author_id: i64) -> Result<bool> {
        queries::author_exists(self.pool(), author_id).await
    }

    async fn publisher_exists(&self, publisher_id: i64) -> Result<bool> {
        queries::publisher_exists(self.pool(), publisher_id).await
    }

    async fn insert_book(&self, book: &NewBook) -> Result<i64> {
        queries::insert_book(self.pool(), book).await
    }
}
