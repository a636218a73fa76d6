//! Owner dashboard figures.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::rating::round_one_decimal;
use crate::types::{Booking, BookingStatus, Car, UserId};

/// Headline numbers for one owner
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerStats {
    /// Listings owned
    pub fleet_size: usize,
    /// Bookings awaiting a decision
    pub pending_count: usize,
    /// Sum of approved booking prices
    pub total_revenue: u64,
    /// Number of approved bookings
    pub total_trips: usize,
    /// Sum of car ratings over the number of rated cars (or 1), one decimal
    pub avg_fleet_rating: f64,
    /// Approved revenue per month of the start date, months 1 to 12
    pub revenue_by_month: BTreeMap<u32, u64>,
}

impl OwnerStats {
    /// Computes the stats of `owner_id` over the given collections
    #[must_use]
    pub fn compute(owner_id: &UserId, cars: &[Car], bookings: &[Booking]) -> Self {
        let fleet: Vec<&Car> = cars.iter().filter(|c| &c.owner_id == owner_id).collect();
        let mine: Vec<&Booking> = bookings.iter().filter(|b| &b.owner_id == owner_id).collect();
        let approved = || mine.iter().filter(|b| b.status == BookingStatus::Approved);

        let rated = fleet.iter().filter(|c| c.rating > 0.0).count().max(1);
        let rating_sum: f64 = fleet.iter().map(|c| c.rating).sum();
        #[allow(clippy::cast_precision_loss)] // fleet sizes are tiny
        let avg_fleet_rating = round_one_decimal(rating_sum / rated as f64);

        let mut revenue_by_month: BTreeMap<u32, u64> = (1..=12).map(|m| (m, 0)).collect();
        for booking in approved() {
            *revenue_by_month.entry(booking.start_date.month()).or_default() += booking.total_price;
        }

        Self {
            fleet_size: fleet.len(),
            pending_count: mine.iter().filter(|b| b.status == BookingStatus::Pending).count(),
            total_revenue: approved().map(|b| b.total_price).sum(),
            total_trips: approved().count(),
            avg_fleet_rating,
            revenue_by_month,
        }
    }
}
