//! Catalog and booking list queries.

use std::cmp::Reverse;

use crate::types::{
    Booking, BookingId, BookingStatus, BookingWithDetails, Car, CarId, CarStatus, Category, Review, Transmission,
    User, UserId,
};

/// Which subset of the fleet to show
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CatalogView {
    /// Cars flagged available
    #[default]
    Browse,
    /// The client's favorites, whatever their flag
    Favorites,
    /// Every car
    All,
}

/// Catalog filters; `None` means "any"
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CarFilter {
    /// Subset to start from
    pub view: CatalogView,
    /// Exact category
    pub category: Option<Category>,
    /// Case-insensitive substring of the car name
    pub query: Option<String>,
    /// Highest acceptable daily price
    pub max_price: Option<u32>,
    /// Exact gearbox
    pub transmission: Option<Transmission>,
    /// Oldest acceptable model year
    pub min_year: Option<i32>,
    /// Newest acceptable model year
    pub max_year: Option<i32>,
}

impl CarFilter {
    /// Whether `car` passes every filter
    #[must_use]
    pub fn matches(&self, car: &Car, favorites: &[CarId]) -> bool {
        let in_view = match self.view {
            CatalogView::Browse => car.status == CarStatus::Available,
            CatalogView::Favorites => favorites.contains(&car.id),
            CatalogView::All => true,
        };
        let query = self.query.as_deref().map(str::trim).unwrap_or_default().to_lowercase();

        in_view
            && self.category.is_none_or(|c| car.category == c)
            && (query.is_empty() || car.name.to_lowercase().contains(&query))
            && self.max_price.is_none_or(|max| car.price_per_day <= max)
            && self.transmission.is_none_or(|t| car.transmission == t)
            && self.min_year.is_none_or(|y| car.model_year >= y)
            && self.max_year.is_none_or(|y| car.model_year <= y)
    }
}

/// Cars passing `filter`, in fleet order
#[must_use]
pub fn filter_cars<'a>(cars: &'a [Car], favorites: &[CarId], filter: &CarFilter) -> Vec<&'a Car> {
    cars.iter().filter(|car| filter.matches(car, favorites)).collect()
}

/// A client's bookings, newest first
#[must_use]
pub fn client_bookings<'a>(bookings: &'a [Booking], client_id: &UserId) -> Vec<&'a Booking> {
    let mut mine: Vec<_> = bookings.iter().filter(|b| &b.client_id == client_id).collect();
    mine.sort_by_key(|b| Reverse(b.created_at));
    mine
}

/// Whether `booking_id` has been reviewed
#[must_use]
pub fn has_review(reviews: &[Review], booking_id: &BookingId) -> bool {
    review_for_booking(reviews, booking_id).is_some()
}

/// The review of `booking_id`, if any
#[must_use]
pub fn review_for_booking<'a>(reviews: &'a [Review], booking_id: &BookingId) -> Option<&'a Review> {
    reviews.iter().find(|r| &r.booking_id == booking_id)
}

/// An owner's incoming bookings, pending first, then newest first
///
/// `users` resolves client names; missing records fall back to placeholder text.
#[must_use]
pub fn owner_bookings(
    bookings: &[Booking],
    cars: &[Car],
    users: &[User],
    reviews: &[Review],
    owner_id: &UserId,
) -> Vec<BookingWithDetails> {
    let mut incoming: Vec<_> = bookings
        .iter()
        .filter(|b| &b.owner_id == owner_id)
        .map(|b| {
            let car = cars.iter().find(|c| c.id == b.car_id);
            let client = users.iter().find(|u| u.id == b.client_id);
            BookingWithDetails {
                booking: b.clone(),
                car_name: car.map_or_else(|| "Unknown Car".to_string(), |c| c.name.clone()),
                car_image: car.map(|c| c.image_url.clone()).unwrap_or_default(),
                client_name: client.map_or_else(|| "Guest Client".to_string(), |u| u.name.clone()),
                client_email: client.map_or_else(|| "No email provided".to_string(), |u| u.email.clone()),
                has_review: has_review(reviews, &b.id),
            }
        })
        .collect();
    incoming.sort_by_key(|d| (d.booking.status != BookingStatus::Pending, Reverse(d.booking.created_at)));
    incoming
}
