//! Rating aggregator.
//!
//! A car's `rating` is the plain mean of its review stars rounded to one
//! decimal, and `review_count` the number of its reviews.

use crate::types::{Car, CarId, Review};

/// Aggregate of a car's reviews
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatingSummary {
    /// Mean stars rounded to one decimal, 0 without reviews
    pub rating: f64,
    /// Number of reviews
    pub review_count: u32,
}

/// Rounds to one decimal place, halves away from zero
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Summarizes all reviews of `car_id`
#[must_use]
pub fn summarize(car_id: &CarId, reviews: &[Review]) -> RatingSummary {
    let (total, count) = reviews
        .iter()
        .filter(|r| &r.car_id == car_id)
        .fold((0u32, 0u32), |(total, count), r| (total + u32::from(r.rating), count + 1));

    if count == 0 {
        return RatingSummary {
            rating: 0.0,
            review_count: 0,
        };
    }
    RatingSummary {
        rating: round_one_decimal(f64::from(total) / f64::from(count)),
        review_count: count,
    }
}

/// Recomputes `car`'s derived fields from the full review list
pub fn apply(car: &mut Car, reviews: &[Review]) {
    let summary = summarize(&car.id, reviews);
    car.rating = summary.rating;
    car.review_count = summary.review_count;
}
