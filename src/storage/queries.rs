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


//! Database query functions
//!
//! Free async functions per entity, all taking the pool explicitly.
//!
//! # Query Patterns
//! - One section per table
//! - Async/await for all database operations
//! - Dynamic WHERE clauses built with `sqlx::QueryBuilder`, values always bound

use crate::catalog::rating::RatingTotals;
use crate::catalog::search::{BookPredicate, SearchFilter};
use crate::error::{CatalogError, Result};
use crate::storage::models::*;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

/// Upper bound on bound parameters per `IN (...)` list
const IN_LIST_CHUNK: usize = 500;

// ============================================================================
// AUTHOR QUERIES
// ============================================================================

/// Insert a new author, returning its author_id
pub async fn insert_author(pool: &SqlitePool, author: &NewAuthor) -> Result<i64> {
    let result = sqlx::query("INSERT INTO Authors (first_name, last_name) VALUES (?, ?)")
        .bind(&author.first_name)
        .bind(&author.last_name)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find author by ID
pub async fn find_author_by_id(pool: &SqlitePool, author_id: i64) -> Result<Option<Author>> {
    let author = sqlx::query_as::<_, Author>("SELECT * FROM Authors WHERE author_id = ?")
        .bind(author_id)
        .fetch_optional(pool)
        .await?;

    Ok(author)
}

/// Check whether an author row exists
pub async fn author_exists(pool: &SqlitePool, author_id: i64) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM Authors WHERE author_id = ?)")
            .bind(author_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

// ============================================================================
// PUBLISHER QUERIES
// ============================================================================

/// Insert a new publisher, returning its publisher_id
pub async fn insert_publisher(pool: &SqlitePool, publisher: &NewPublisher) -> Result<i64> {
    let result = sqlx::query("INSERT INTO Publishers (name) VALUES (?)")
        .bind(&publisher.name)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find publisher by ID
pub async fn find_publisher_by_id(pool: &SqlitePool, publisher_id: i64) -> Result<Option<Publisher>> {
    let publisher = sqlx::query_as::<_, Publisher>("SELECT * FROM Publishers WHERE publisher_id = ?")
        .bind(publisher_id)
        .fetch_optional(pool)
        .await?;

    Ok(publisher)
}

/// Check whether a publisher row exists
pub async fn publisher_exists(pool: &SqlitePool, publisher_id: i64) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM Publishers WHERE publisher_id = ?)")
            .bind(publisher_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

// ============================================================================
// FORMAT TYPE QUERIES
// ============================================================================

/// Insert a new format type, returning its book_format_type_id
pub async fn insert_book_format_type(pool: &SqlitePool, format_type: &NewBookFormatType) -> Result<i64> {
    let result = sqlx::query("INSERT INTO BookFormatTypes (name, physical) VALUES (?, ?)")
        .bind(&format_type.name)
        .bind(format_type.physical)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find format type by ID
pub async fn find_book_format_type_by_id(
    pool: &SqlitePool,
    book_format_type_id: i64,
) -> Result<Option<BookFormatType>> {
    let format_type = sqlx::query_as::<_, BookFormatType>(
        "SELECT * FROM BookFormatTypes WHERE book_format_type_id = ?",
    )
    .bind(book_format_type_id)
    .fetch_optional(pool)
    .await?;

    Ok(format_type)
}

/// List all format types
pub async fn list_book_format_types(pool: &SqlitePool) -> Result<Vec<BookFormatType>> {
    let types = sqlx::query_as::<_, BookFormatType>(
        "SELECT * FROM BookFormatTypes ORDER BY book_format_type_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(types)
}

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Insert a new book
///
/// Only presence is checked here; existence of the referenced author and
/// publisher is enforced by foreign keys (see `BookCatalogQuery::create_book`
/// for the validated path). Returns the book_id of the inserted book.
pub async fn insert_book(pool: &SqlitePool, book: &NewBook) -> Result<i64> {
    let errors = book.presence_errors();
    let (true, Some(publisher_id), Some(author_id)) =
        (errors.is_empty(), book.publisher_id, book.author_id)
    else {
        return Err(CatalogError::validation(errors));
    };

    let result = sqlx::query("INSERT INTO Books (title, publisher_id, author_id) VALUES (?, ?, ?)")
        .bind(&book.title)
        .bind(publisher_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find book by ID
pub async fn find_book_by_id(pool: &SqlitePool, book_id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

/// List books in creation order with pagination
pub async fn list_books(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>("SELECT * FROM Books ORDER BY book_id LIMIT ? OFFSET ?")
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(books)
}

/// Count total books
pub async fn count_books(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Books")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Delete a book (reviews and format links go with it via CASCADE)
pub async fn delete_book(pool: &SqlitePool, book_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM Books WHERE book_id = ?")
        .bind(book_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Find books matching every predicate of the filter, in creation order
///
/// Format predicates become `EXISTS` conjuncts so a book matches at most once
/// however many links join. Text predicates are evaluated on the fetched rows:
/// SQLite's `UPPER` and `LIKE` only fold ASCII, so "über" would miss "Über".
pub async fn search_books(pool: &SqlitePool, filter: &SearchFilter) -> Result<Vec<Book>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT b.*, a.last_name AS author_last_name, p.name AS publisher_name \
         FROM Books b \
         JOIN Authors a ON a.author_id = b.author_id \
         JOIN Publishers p ON p.publisher_id = b.publisher_id \
         WHERE 1 = 1",
    );

    for predicate in filter.predicates() {
        match predicate {
            BookPredicate::HasFormatType(book_format_type_id) => {
                builder.push(
                    " AND EXISTS (SELECT 1 FROM BookFormats bf WHERE bf.book_id = b.book_id AND bf.book_format_type_id = ",
                );
                builder.push_bind(*book_format_type_id);
                builder.push(")");
            }
            BookPredicate::HasPhysicalFormat => {
                builder.push(
                    " AND EXISTS (SELECT 1 FROM BookFormats bf \
                     JOIN BookFormatTypes t ON t.book_format_type_id = bf.book_format_type_id \
                     WHERE bf.book_id = b.book_id AND t.physical = 1)",
                );
            }
            BookPredicate::TitleContains(_) | BookPredicate::TitleOrCreditedName(_) => {}
        }
    }
    builder.push(" ORDER BY b.book_id");

    let rows = builder.build_query_as::<BookSearchRow>().fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .filter(|row| {
            filter.predicates().iter().all(|predicate| {
                predicate.matches_names(&row.book.title, &row.author_last_name, &row.publisher_name)
            })
        })
        .map(|row| row.book)
        .collect())
}

// ============================================================================
// BOOK FORMAT QUERIES
// ============================================================================

/// Link book to format type, returning the book_format_id
pub async fn add_book_format(pool: &SqlitePool, book_id: i64, book_format_type_id: i64) -> Result<i64> {
    let result = sqlx::query("INSERT INTO BookFormats (book_id, book_format_type_id) VALUES (?, ?)")
        .bind(book_id)
        .bind(book_format_type_id)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find the raw format links of a book, duplicates included
pub async fn find_book_formats_by_book(pool: &SqlitePool, book_id: i64) -> Result<Vec<BookFormat>> {
    let links = sqlx::query_as::<_, BookFormat>(
        "SELECT * FROM BookFormats WHERE book_id = ? ORDER BY book_format_id",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;

    Ok(links)
}

/// Find the distinct format types linked to a book
pub async fn find_format_types_by_book(pool: &SqlitePool, book_id: i64) -> Result<Vec<BookFormatType>> {
    let types = sqlx::query_as::<_, BookFormatType>(
        r#"
        SELECT t.* FROM BookFormatTypes t
        WHERE t.book_format_type_id IN (
            SELECT bf.book_format_type_id FROM BookFormats bf WHERE bf.book_id = ?
        )
        ORDER BY t.book_format_type_id
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;

    Ok(types)
}

// ============================================================================
// REVIEW QUERIES
// ============================================================================

/// Insert a review, returning its book_review_id
pub async fn insert_book_review(pool: &SqlitePool, review: &NewBookReview) -> Result<i64> {
    let result = sqlx::query("INSERT INTO BookReviews (book_id, rating) VALUES (?, ?)")
        .bind(review.book_id)
        .bind(review.rating)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find reviews for a book in creation order
pub async fn find_reviews_by_book(pool: &SqlitePool, book_id: i64) -> Result<Vec<BookReview>> {
    let reviews = sqlx::query_as::<_, BookReview>(
        "SELECT * FROM BookReviews WHERE book_id = ? ORDER BY book_review_id",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}

/// Sum and count of review ratings for many books in one grouped query per chunk
///
/// Books without reviews are absent from the returned map.
pub async fn rating_totals_for_books(
    pool: &SqlitePool,
    book_ids: &[i64],
) -> Result<HashMap<i64, RatingTotals>> {
    let mut totals = HashMap::with_capacity(book_ids.len());

    for chunk in book_ids.chunks(IN_LIST_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT book_id, SUM(rating), COUNT(*) FROM BookReviews WHERE book_id IN (",
        );
        let mut ids = builder.separated(", ");
        for book_id in chunk {
            ids.push_bind(*book_id);
        }
        ids.push_unseparated(") GROUP BY book_id");

        let rows: Vec<(i64, i64, i64)> = builder.build_query_as().fetch_all(pool).await?;
        for (book_id, sum, count) in rows {
            totals.insert(book_id, RatingTotals { sum, count });
        }
    }

    Ok(totals)
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Clear all catalog data (for testing)
///
/// Deletes every row from every catalog table.
/// Use with caution - this is irreversible!
pub async fn clear_catalog(pool: &SqlitePool) -> Result<()> {
    // Delete in correct order to respect foreign keys
    sqlx::query("DELETE FROM BookFormats").execute(pool).await?;
    sqlx::query("DELETE FROM BookReviews").execute(pool).await?;
    sqlx::query("DELETE FROM Books").execute(pool).await?;
    sqlx::query("DELETE FROM BookFormatTypes").execute(pool).await?;
    sqlx::query("DELETE FROM Authors").execute(pool).await?;
    sqlx::query("DELETE FROM Publishers").execute(pool).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::search::SearchOptions;
    use crate::storage::database::Database;

    async fn seed_references(db: &Database) -> (i64, i64) {
        let author_id = insert_author(db.pool(), &NewAuthor::new("Ray", "Kurzweil"))
            .await
            .expect("Failed to insert author");
        let publisher_id = insert_publisher(db.pool(), &NewPublisher::new("Viking"))
            .await
            .expect("Failed to insert publisher");
        (author_id, publisher_id)
    }

    #[tokio::test]
    async fn test_insert_and_find_book() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let (author_id, publisher_id) = seed_references(&db).await;

        let book_id = insert_book(
            db.pool(),
            &NewBook::new("The Singularity Is Near", publisher_id, author_id),
        )
        .await
        .expect("Failed to insert book");
        assert!(book_id > 0);

        let book = find_book_by_id(db.pool(), book_id)
            .await
            .expect("Failed to find book")
            .expect("Book missing");
        assert_eq!(book.title, "The Singularity Is Near");
        assert_eq!(book.author_id, author_id);
        assert_eq!(book.publisher_id, publisher_id);
        assert_eq!(count_books(db.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_book_rejects_unknown_author() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let (_, publisher_id) = seed_references(&db).await;

        let err = insert_book(db.pool(), &NewBook::new("Orphan", publisher_id, 999))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::SqlxError(_)));
    }

    #[tokio::test]
    async fn test_insert_book_rejects_missing_reference() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let err = insert_book(db.pool(), &NewBook { title: "Loose".to_string(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(count_books(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_format_types_are_distinct() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let (author_id, publisher_id) = seed_references(&db).await;
        let book_id = insert_book(db.pool(), &NewBook::new("Twice Linked", publisher_id, author_id))
            .await
            .unwrap();
        let pdf = insert_book_format_type(db.pool(), &NewBookFormatType::new("PDF", false))
            .await
            .unwrap();

        add_book_format(db.pool(), book_id, pdf).await.unwrap();
        add_book_format(db.pool(), book_id, pdf).await.unwrap();

        let links = find_book_formats_by_book(db.pool(), book_id).await.unwrap();
        assert_eq!(links.len(), 2);

        let types = find_format_types_by_book(db.pool(), book_id).await.unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "PDF");
        assert!(!types[0].physical);
    }

    #[tokio::test]
    async fn test_delete_book_cascades() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let (author_id, publisher_id) = seed_references(&db).await;
        let book_id = insert_book(db.pool(), &NewBook::new("Short Lived", publisher_id, author_id))
            .await
            .unwrap();
        let hardcover = insert_book_format_type(db.pool(), &NewBookFormatType::new("Hardcover", true))
            .await
            .unwrap();
        add_book_format(db.pool(), book_id, hardcover).await.unwrap();
        insert_book_review(db.pool(), &NewBookReview::new(book_id, 5)).await.unwrap();

        delete_book(db.pool(), book_id).await.unwrap();

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM BookFormats")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM BookReviews")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!((links, reviews), (0, 0));
        // Reference data survives
        assert!(find_book_format_type_by_id(db.pool(), hardcover).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rating_totals_skip_unreviewed_books() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let (author_id, publisher_id) = seed_references(&db).await;
        let reviewed = insert_book(db.pool(), &NewBook::new("Reviewed", publisher_id, author_id))
            .await
            .unwrap();
        let unreviewed = insert_book(db.pool(), &NewBook::new("Unreviewed", publisher_id, author_id))
            .await
            .unwrap();
        for rating in [5, 4, 4] {
            insert_book_review(db.pool(), &NewBookReview::new(reviewed, rating))
                .await
                .unwrap();
        }

        let totals = rating_totals_for_books(db.pool(), &[reviewed, unreviewed])
            .await
            .unwrap();

        assert_eq!(totals.get(&reviewed), Some(&RatingTotals { sum: 13, count: 3 }));
        assert!(!totals.contains_key(&unreviewed));
        assert!(rating_totals_for_books(db.pool(), &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_books_and_clear_catalog() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let (author_id, publisher_id) = seed_references(&db).await;
        for title in ["First", "Second", "Third"] {
            insert_book(db.pool(), &NewBook::new(title, publisher_id, author_id))
                .await
                .unwrap();
        }

        let page = list_books(db.pool(), 2, 1).await.unwrap();
        let titles: Vec<&str> = page.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "Third"]);

        clear_catalog(db.pool()).await.unwrap();
        assert_eq!(count_books(db.pool()).await.unwrap(), 0);
        assert!(find_author_by_id(db.pool(), author_id).await.unwrap().is_none());
        assert!(list_book_format_types(db.pool()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let pool = db.pool();
        let author_id = insert_author(pool, &NewAuthor::new("Émile", "Zola")).await.unwrap();
        let publisher_id = insert_publisher(pool, &NewPublisher::new("Éditions Dupuis"))
            .await
            .unwrap();
        let book_id = insert_book(pool, &NewBook::new("Über Alles", publisher_id, author_id))
            .await
            .unwrap();

        for (query, options) in [
            ("über", SearchOptions::default().with_title_only(true)),
            ("ÜBER ALLES", SearchOptions::default()),
            ("éditions dupuis", SearchOptions::default()),
            ("ZOLA", SearchOptions::default()),
        ] {
            let books = search_books(pool, &SearchFilter::new(query, &options)).await.unwrap();
            let ids: Vec<i64> = books.iter().map(|b| b.book_id).collect();
            assert_eq!(ids, vec![book_id], "query {:?}", query);
        }

        let books = search_books(
            pool,
            &SearchFilter::new("éditions", &SearchOptions::default()),
        )
        .await
        .unwrap();
        assert!(books.is_empty(), "publisher names must match in full");
    }
}
