//! Average review rating
//!
//! The mean of a book's integer review ratings rounded to one decimal place.
//! A book with no reviews has no average at all; `0.0` is a real average.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Running totals of a book's review ratings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingTotals {
    pub sum: i64,
    pub count: i64,
}

/// Mean rating rounded to one decimal (half away from zero)
///
/// Always displays with exactly one fractional digit, so a mean of 3 is `3.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AverageRating(f64);

impl AverageRating {
    /// Average of the given ratings, `None` when there are none
    pub fn from_ratings<I>(ratings: I) -> Option<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        let totals = ratings
            .into_iter()
            .fold(RatingTotals::default(), |acc, rating| RatingTotals {
                sum: acc.sum + rating,
                count: acc.count + 1,
            });
        Self::from_totals(totals)
    }

    /// Average from precomputed totals, `None` when the count is zero
    pub fn from_totals(totals: RatingTotals) -> Option<Self> {
        if totals.count == 0 {
            return None;
        }
        let mean = totals.sum as f64 / totals.count as f64;
        Some(Self((mean * 10.0).round() / 10.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for AverageRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl From<AverageRating> for f64 {
    fn from(rating: AverageRating) -> Self {
        rating.0
    }
}
