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


use crate::catalog::rating::AverageRating;
use crate::catalog::search::{rank_by_rating, RatedBook, SearchFilter, SearchOptions};
use crate::catalog::store::CatalogStore;
use crate::error::{CatalogError, Result};
use crate::storage::models::{Author, Book, BookFormatType, BookReview, NewBook, Publisher};
use tracing::{debug, warn};

/// Read side of the catalog plus validated book creation
///
/// All lookups go through the store it was built with.
#[derive(Debug, Clone)]
pub struct BookCatalogQuery<S> {
    store: S,
}

impl<S: CatalogStore> BookCatalogQuery<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Search the catalog, best rated first
    ///
    /// # Arguments
    /// * `query` - text matched against titles (substring) and, unless
    ///   `title_only` is set, author last names and publisher names (whole value)
    /// * `options` - additional filters; each one can only narrow the result
    ///
    /// An empty result is not an error, including when `book_format_type_id`
    /// names a format type that doesn't exist.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<RatedBook>> {
        let filter = SearchFilter::new(query, options);
        debug!(query, ?options, predicates = filter.predicates().len(), "searching catalog");

        let books = self.store.find_books(&filter).await?;
        let book_ids: Vec<i64> = books.iter().map(|book| book.book_id).collect();
        let totals = self.store.rating_totals(&book_ids).await?;

        let ranked = rank_by_rating(books, &totals);
        debug!(query, results = ranked.len(), "search finished");
        Ok(ranked)
    }

    /// The book's author
    pub async fn author(&self, book: &Book) -> Result<Author> {
        self.store
            .find_author(book.author_id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!("Author {} of book {}", book.author_id, book.book_id))
            })
    }

    /// The book's publisher
    pub async fn publisher(&self, book: &Book) -> Result<Publisher> {
        self.store
            .find_publisher(book.publisher_id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!(
                    "Publisher {} of book {}",
                    book.publisher_id, book.book_id
                ))
            })
    }

    /// Author name as "last, first"
    pub async fn author_name(&self, book: &Book) -> Result<String> {
        Ok(self.author(book).await?.display_name())
    }

    /// Distinct format types the book is available in
    pub async fn format_types(&self, book: &Book) -> Result<Vec<BookFormatType>> {
        self.store.format_types_for_book(book.book_id).await
    }

    /// Whether any of the book's formats is physical
    pub async fn physical_available(&self, book: &Book) -> Result<bool> {
        let types = self.format_types(book).await?;
        Ok(types.iter().any(|format_type| format_type.physical))
    }

    /// The book's reviews in creation order
    pub async fn reviews(&self, book: &Book) -> Result<Vec<BookReview>> {
        self.store.reviews_for_book(book.book_id).await
    }

    /// Mean review rating to one decimal, `None` without reviews
    pub async fn average_rating(&self, book: &Book) -> Result<Option<AverageRating>> {
        let reviews = self.reviews(book).await?;
        Ok(AverageRating::from_ratings(reviews.iter().map(|review| review.rating)))
    }

    /// Validate and persist a new book, returning its book_id
    ///
    /// Checks, in order, that a title, a publisher reference and an author
    /// reference are present and that the referenced rows exist. Every failed
    /// check is reported in a single [`CatalogError::Validation`]; nothing is
    /// written unless all pass.
    pub async fn create_book(&self, new_book: &NewBook) -> Result<i64> {
        let mut errors = new_book.presence_errors();

        if let Some(publisher_id) = new_book.publisher_id {
            if !self.store.publisher_exists(publisher_id).await? {
                errors.push(format!("Publisher {} must exist", publisher_id));
            }
        }
        if let Some(author_id) = new_book.author_id {
            if !self.store.author_exists(author_id).await? {
                errors.push(format!("Author {} must exist", author_id));
            }
        }

        if !errors.is_empty() {
            warn!(title = %new_book.title, ?errors, "rejected book");
            return Err(CatalogError::validation(errors));
        }

        let book_id = self.store.insert_book(new_book).await?;
        debug!(book_id, title = %new_book.title, "created book");
        Ok(book_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{NewAuthor, NewBookFormatType, NewBookReview, NewPublisher};
    use crate::storage::{queries, Database};

    struct Fixture {
        catalog: BookCatalogQuery<Database>,
        book: Book,
    }

    /// "The Singularity Is Near" by Ray Kurzweil, published by Viking
    async fn singularity() -> Fixture {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let author_id = queries::insert_author(db.pool(), &NewAuthor::new("Ray", "Kurzweil"))
            .await
            .unwrap();
        let publisher_id = queries::insert_publisher(db.pool(), &NewPublisher::new("Viking"))
            .await
            .unwrap();

        let catalog = BookCatalogQuery::new(db);
        let book_id = catalog
            .create_book(&NewBook::new("The Singularity Is Near", publisher_id, author_id))
            .await
            .expect("Failed to create book");
        let book = queries::find_book_by_id(catalog.store().pool(), book_id)
            .await
            .unwrap()
            .expect("Book missing");

        Fixture { catalog, book }
    }

    async fn link_format(fixture: &Fixture, name: &str, physical: bool) -> i64 {
        let pool = fixture.catalog.store().pool();
        let type_id = queries::insert_book_format_type(pool, &NewBookFormatType::new(name, physical))
            .await
            .unwrap();
        queries::add_book_format(pool, fixture.book.book_id, type_id)
            .await
            .unwrap();
        type_id
    }

    async fn review(fixture: &Fixture, rating: i64) {
        queries::insert_book_review(
            fixture.catalog.store().pool(),
            &NewBookReview::new(fixture.book.book_id, rating),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_associations() {
        let f = singularity().await;

        assert_eq!(f.catalog.author(&f.book).await.unwrap().last_name, "Kurzweil");
        assert_eq!(f.catalog.publisher(&f.book).await.unwrap().name, "Viking");
    }

    #[tokio::test]
    async fn test_format_types_lists_linked_types() {
        let f = singularity().await;
        let mut linked = Vec::new();
        for (name, physical) in [("PDF", false), ("Kindle", false), ("Hardcover", true)] {
            linked.push(link_format(&f, name, physical).await);
        }

        let types = f.catalog.format_types(&f.book).await.unwrap();
        let ids: Vec<i64> = types.iter().map(|t| t.book_format_type_id).collect();
        assert_eq!(ids, linked);
    }

    #[tokio::test]
    async fn test_physical_available_with_hardcover() {
        let f = singularity().await;
        link_format(&f, "PDF", false).await;
        link_format(&f, "Hardcover", true).await;

        assert!(f.catalog.physical_available(&f.book).await.unwrap());
    }

    #[tokio::test]
    async fn test_physical_unavailable_with_digital_only() {
        let f = singularity().await;
        assert!(!f.catalog.physical_available(&f.book).await.unwrap());

        link_format(&f, "PDF", false).await;
        link_format(&f, "Kindle", false).await;
        assert!(!f.catalog.physical_available(&f.book).await.unwrap());
    }

    #[tokio::test]
    async fn test_author_name() {
        let f = singularity().await;
        assert_eq!(f.catalog.author_name(&f.book).await.unwrap(), "Kurzweil, Ray");
    }

    #[tokio::test]
    async fn test_author_name_of_unsaved_author_is_not_found() {
        let f = singularity().await;
        let mut detached = f.book.clone();
        detached.author_id = 999;

        let err = f.catalog.author_name(&detached).await.unwrap_err();
        assert!(matches!(err, CatalogError::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn test_average_rating_rounds_to_one_decimal() {
        let f = singularity().await;
        for rating in [5, 4, 4] {
            review(&f, rating).await;
        }

        let average = f.catalog.average_rating(&f.book).await.unwrap().unwrap();
        assert_eq!(average.value(), 4.3);
    }

    #[tokio::test]
    async fn test_average_rating_keeps_decimal_for_whole_number() {
        let f = singularity().await;
        review(&f, 4).await;
        review(&f, 2).await;

        let average = f.catalog.average_rating(&f.book).await.unwrap().unwrap();
        assert_eq!(average.value(), 3.0);
        assert_eq!(average.to_string(), "3.0");
    }

    #[tokio::test]
    async fn test_average_rating_absent_without_reviews() {
        let f = singularity().await;
        assert_eq!(f.catalog.average_rating(&f.book).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_book_collects_every_error() {
        let f = singularity().await;
        let before = queries::count_books(f.catalog.store().pool()).await.unwrap();

        let err = f
            .catalog
            .create_book(&NewBook {
                title: "".to_string(),
                publisher_id: Some(f.book.publisher_id),
                author_id: Some(404),
            })
            .await
            .unwrap_err();

        match err {
            CatalogError::Validation { error_count, errors } => {
                assert_eq!(error_count, 2);
                assert_eq!(errors[0], "Title can't be blank");
                assert_eq!(errors[1], "Author 404 must exist");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(queries::count_books(f.catalog.store().pool()).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_create_book_requires_references() {
        let f = singularity().await;

        let err = f
            .catalog
            .create_book(&NewBook {
                title: "No Strings".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(err.is_validation_error());
        assert!(err.to_string().contains("Publisher can't be blank"));
        assert!(err.to_string().contains("Author can't be blank"));
    }
}
