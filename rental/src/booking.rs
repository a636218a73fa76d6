//! Booking service: creation and owner decisions.
//!
//! Availability is enforced when a booking is created and never again;
//! approval and rejection are plain status transitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::availability;
use crate::error::RentalError;
use crate::types::{Booking, BookingId, BookingStatus, Car, CarId, DateRange, UserId};

/// A client's booking form, with dates as entered
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Car to book
    pub car_id: CarId,
    /// First day as `YYYY-MM-DD`, if chosen
    pub start_date: Option<String>,
    /// Last day as `YYYY-MM-DD`, if chosen
    pub end_date: Option<String>,
    /// Pickup location
    pub pickup_location: String,
}

impl BookingRequest {
    /// A request with both dates filled in
    #[must_use]
    pub fn new(
        car_id: impl Into<CarId>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        pickup_location: impl Into<String>,
    ) -> Self {
        Self {
            car_id: car_id.into(),
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
            pickup_location: pickup_location.into(),
        }
    }
}

/// Creates a PENDING booking after checking dates and availability
///
/// `bookings` are the existing bookings; the ones of other cars are ignored.
///
/// # Errors
///
/// - `MissingStartDate`, `MissingEndDate`, `InvalidDate`, `InvalidRange` for
///   malformed dates
/// - `EmptyField` for a blank pickup location
/// - `PastDate`, `DatesUnavailable` when a day of the range is not free
pub fn create(
    car: &Car,
    client_id: &UserId,
    request: &BookingRequest,
    bookings: &[Booking],
    today: NaiveDate,
    id: BookingId,
    created_at: DateTime<Utc>,
) -> Result<Booking, RentalError> {
    let range = DateRange::parse(request.start_date.as_deref(), request.end_date.as_deref())?;
    if request.pickup_location.trim().is_empty() {
        return Err(RentalError::EmptyField {
            field: "pickup_location",
        });
    }
    availability::check_range(&car.id, &range, today, bookings)?;

    Ok(Booking {
        id,
        car_id: car.id.clone(),
        client_id: client_id.clone(),
        owner_id: car.owner_id.clone(),
        start_date: range.start(),
        end_date: range.end(),
        pickup_location: request.pickup_location.trim().to_string(),
        total_price: availability::quote(car, &range),
        status: BookingStatus::Pending,
        created_at,
    })
}

/// Moves a booking to `target`, returning whether anything changed
///
/// Repeating the current decision is a no-op. Reversing a decision is not
/// allowed.
fn transition(booking: &mut Booking, target: BookingStatus) -> Result<bool, RentalError> {
    match (booking.status, target) {
        (current, target) if current == target => Ok(false),
        (BookingStatus::Pending, _) => {
            booking.status = target;
            Ok(true)
        },
        (from, to) => Err(RentalError::InvalidTransition { from, to }),
    }
}

/// Approves a booking; approving twice is a no-op
///
/// # Errors
///
/// Returns [`RentalError::InvalidTransition`] for a rejected booking.
pub fn approve(booking: &mut Booking) -> Result<bool, RentalError> {
    transition(booking, BookingStatus::Approved)
}

/// Rejects a booking; rejecting twice is a no-op
///
/// # Errors
///
/// Returns [`RentalError::InvalidTransition`] for an approved booking.
pub fn reject(booking: &mut Booking) -> Result<bool, RentalError> {
    transition(booking, BookingStatus::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::types::parse_day;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        parse_day("2024-06-01").unwrap()
    }

    fn car(id: &str) -> Car {
        seed::cars().into_iter().find(|c| c.id.as_str() == id).unwrap()
    }

    #[test]
    fn new_booking_is_pending_with_frozen_price() {
        let mut tesla = car("c1");
        tesla.price_per_day = 100;
        let request = BookingRequest::new("c1", "2024-06-10", "2024-06-12", "SFO");

        let booking = create(&tesla, &UserId::new("u2"), &request, &[], today(), BookingId::new("b2"), now()).unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total_price, 300);
        assert_eq!(booking.owner_id, tesla.owner_id);
        assert_eq!(booking.created_at, now());
    }

    #[test]
    fn create_rechecks_availability() {
        let porsche = car("c3");
        let request = BookingRequest::new("c3", "2024-06-12", "2024-06-18", "LAX");
        let result = create(
            &porsche,
            &UserId::new("u2"),
            &request,
            &seed::bookings(),
            today(),
            BookingId::new("b2"),
            now(),
        );
        assert!(matches!(result, Err(RentalError::DatesUnavailable { .. })));
    }

    #[test]
    fn create_requires_dates_and_pickup() {
        let tesla = car("c1");
        let client = UserId::new("u2");
        let mut request = BookingRequest::new("c1", "2024-06-10", "2024-06-12", " ");
        assert_eq!(
            create(&tesla, &client, &request, &[], today(), BookingId::new("x"), now()),
            Err(RentalError::EmptyField {
                field: "pickup_location"
            })
        );

        request.pickup_location = "SFO".to_string();
        request.end_date = None;
        assert_eq!(
            create(&tesla, &client, &request, &[], today(), BookingId::new("x"), now()),
            Err(RentalError::MissingEndDate)
        );
    }

    #[test]
    fn approve_is_idempotent() {
        let mut booking = seed::bookings().remove(0);
        booking.status = BookingStatus::Pending;

        assert_eq!(approve(&mut booking), Ok(true));
        assert_eq!(approve(&mut booking), Ok(false));
        assert_eq!(booking.status, BookingStatus::Approved);
    }

    #[test]
    fn decisions_never_revert() {
        let mut booking = seed::bookings().remove(0);
        assert_eq!(booking.status, BookingStatus::Approved);
        assert_eq!(
            reject(&mut booking),
            Err(RentalError::InvalidTransition {
                from: BookingStatus::Approved,
                to: BookingStatus::Rejected,
            })
        );

        booking.status = BookingStatus::Rejected;
        assert_eq!(reject(&mut booking), Ok(false));
        assert!(approve(&mut booking).is_err());
    }
}
