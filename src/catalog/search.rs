//! Catalog search: options, predicate chain and rating order
//!
//! A search is a conjunction of [`BookPredicate`]s chosen by which options are
//! set. The store evaluates each predicate however it likes; the resulting
//! candidates come back in creation order and are then ranked by average
//! rating here.
//!
//! Text matching is asymmetric: titles match on a case-insensitive substring,
//! while author last names and publisher names must equal the query
//! (case-insensitively) in full. Case is folded with Rust's Unicode tables,
//! and the query is plain text with no wildcard characters.

use crate::catalog::rating::{AverageRating, RatingTotals};
use crate::storage::models::Book;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Optional, independently combinable search settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Match the query against titles only
    #[serde(default)]
    pub title_only: bool,
    /// Keep books linked to this format type
    #[serde(default)]
    pub book_format_type_id: Option<i64>,
    /// `Some(true)` keeps books linked to any physical format type; other values don't filter
    #[serde(default)]
    pub book_format_physical: Option<bool>,
}

impl SearchOptions {
    pub fn with_title_only(mut self, title_only: bool) -> Self {
        self.title_only = title_only;
        self
    }

    pub fn with_format_type(mut self, book_format_type_id: i64) -> Self {
        self.book_format_type_id = Some(book_format_type_id);
        self
    }

    pub fn with_physical(mut self, physical: bool) -> Self {
        self.book_format_physical = Some(physical);
        self
    }
}

/// One conjunct of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookPredicate {
    /// Title contains the text, ignoring case
    TitleContains(String),
    /// Title contains the text, or the author's last name or the publisher's
    /// name equals it, ignoring case
    TitleOrCreditedName(String),
    /// At least one format link to this format type
    HasFormatType(i64),
    /// At least one format link to a physical format type
    HasPhysicalFormat,
}

impl BookPredicate {
    /// Evaluate the text part of the predicate against a book's names
    ///
    /// Format predicates depend on links, not names, and always pass here.
    pub fn matches_names(&self, title: &str, author_last_name: &str, publisher_name: &str) -> bool {
        match self {
            BookPredicate::TitleContains(text) => fold_case(title).contains(&fold_case(text)),
            BookPredicate::TitleOrCreditedName(text) => {
                let text = fold_case(text);
                fold_case(title).contains(&text)
                    || fold_case(author_last_name) == text
                    || fold_case(publisher_name) == text
            }
            BookPredicate::HasFormatType(_) | BookPredicate::HasPhysicalFormat => true,
        }
    }
}

/// Case-fold text for comparison ("straße" and "STRASSE" fold equal)
pub fn fold_case(text: &str) -> String {
    text.to_uppercase()
}

/// Conjunction of predicates a book must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    predicates: Vec<BookPredicate>,
}

impl SearchFilter {
    /// Build the predicate chain for a query and its options
    pub fn new(query: &str, options: &SearchOptions) -> Self {
        let text_match = if options.title_only {
            BookPredicate::TitleContains(query.to_string())
        } else {
            BookPredicate::TitleOrCreditedName(query.to_string())
        };

        let mut filter = Self::matching(text_match);
        if let Some(book_format_type_id) = options.book_format_type_id {
            filter = filter.and(BookPredicate::HasFormatType(book_format_type_id));
        }
        if options.book_format_physical == Some(true) {
            filter = filter.and(BookPredicate::HasPhysicalFormat);
        }
        filter
    }

    /// Filter with a single predicate
    pub fn matching(predicate: BookPredicate) -> Self {
        Self {
            predicates: vec![predicate],
        }
    }

    /// Narrow the filter with another predicate
    pub fn and(mut self, predicate: BookPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[BookPredicate] {
        &self.predicates
    }
}

/// Search hit: the book and its average rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedBook {
    #[serde(flatten)]
    pub book: Book,
    pub average_rating: Option<AverageRating>,
}

/// Attach ratings and sort best rated first
///
/// Unrated books go after every rated one. The sort is stable, so books with
/// equal ratings (or none) keep the order they came in, which is creation order
/// for store results.
pub fn rank_by_rating(books: Vec<Book>, totals: &HashMap<i64, RatingTotals>) -> Vec<RatedBook> {
    let mut rated: Vec<RatedBook> = books
        .into_iter()
        .map(|book| {
            let average_rating = totals
                .get(&book.book_id)
                .copied()
                .and_then(AverageRating::from_totals);
            RatedBook {
                book,
                average_rating,
            }
        })
        .collect();

    rated.sort_by(|a, b| descending(a.average_rating, b.average_rating));
    rated
}

fn descending(a: Option<AverageRating>, b: Option<AverageRating>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.value().total_cmp(&a.value()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
