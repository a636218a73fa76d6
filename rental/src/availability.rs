//! Availability engine.
//!
//! Pure queries over a car's bookings. A day is *booked* when a PENDING or
//! APPROVED booking of the car covers it, endpoints included, so a car cannot
//! be handed over and picked up again on the same day. A day is *past* when it
//! precedes today's calendar day. All comparisons are on [`NaiveDate`]; no
//! time of day or time zone takes part.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::RentalError;
use crate::types::{Booking, Car, CarId, DateRange};

/// Bookings of `car_id` that occupy their days
fn blocking<'a>(car_id: &'a CarId, bookings: &'a [Booking]) -> impl Iterator<Item = &'a Booking> + 'a {
    bookings
        .iter()
        .filter(move |b| &b.car_id == car_id && b.status.blocks_dates())
}

/// Whether `day` is covered by an active booking of the car
#[must_use]
pub fn is_booked(car_id: &CarId, day: NaiveDate, bookings: &[Booking]) -> bool {
    blocking(car_id, bookings).any(|b| b.occupies(day))
}

/// Whether `day` is strictly before `today`
#[must_use]
pub fn is_past(day: NaiveDate, today: NaiveDate) -> bool {
    day < today
}

/// Whether `day` cannot be selected: past or booked
#[must_use]
pub fn is_date_disabled(car_id: &CarId, day: NaiveDate, today: NaiveDate, bookings: &[Booking]) -> bool {
    is_past(day, today) || is_booked(car_id, day, bookings)
}

/// Checks every day of `range`, stopping at the first unusable one
///
/// # Errors
///
/// Returns [`RentalError::PastDate`] or [`RentalError::DatesUnavailable`]
/// naming the first offending day.
pub fn check_range(
    car_id: &CarId,
    range: &DateRange,
    today: NaiveDate,
    bookings: &[Booking],
) -> Result<(), RentalError> {
    // Everything up to the range start is past when the start is.
    if is_past(range.start(), today) {
        return Err(RentalError::PastDate { date: range.start() });
    }
    match range.days().find(|day| is_booked(car_id, *day, bookings)) {
        Some(date) => Err(RentalError::DatesUnavailable {
            car_id: car_id.clone(),
            date,
        }),
        None => Ok(()),
    }
}

/// Whether every day of `range` is neither past nor booked
#[must_use]
pub fn is_range_available(car_id: &CarId, range: &DateRange, today: NaiveDate, bookings: &[Booking]) -> bool {
    check_range(car_id, range, today, bookings).is_ok()
}

/// Validates raw endpoints and availability in one step
///
/// # Errors
///
/// Returns [`RentalError::InvalidRange`] when `end < start`, otherwise the
/// errors of [`check_range`].
pub fn validate_range(
    car_id: &CarId,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    bookings: &[Booking],
) -> Result<DateRange, RentalError> {
    let range = DateRange::new(start, end)?;
    check_range(car_id, &range, today, bookings)?;
    Ok(range)
}

/// Every booked day of the car, sorted and deduplicated
#[must_use]
pub fn blackout_dates(car_id: &CarId, bookings: &[Booking]) -> BTreeSet<NaiveDate> {
    blocking(car_id, bookings).flat_map(|b| b.range().days()).collect()
}

/// Total price for renting `car` over `range`
#[must_use]
pub fn quote(car: &Car, range: &DateRange) -> u64 {
    range.day_count() * u64::from(car.price_per_day)
}

/// One cell of the booking calendar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    /// The day
    pub date: NaiveDate,
    /// Before today
    pub past: bool,
    /// Covered by an active booking
    pub booked: bool,
    /// Is today
    pub today: bool,
}

impl CalendarDay {
    /// Whether the cell is unselectable
    #[must_use]
    pub const fn disabled(&self) -> bool {
        self.past || self.booked
    }
}

/// All days of a month for one car
///
/// Returns an empty grid for a month outside 1..=12.
#[must_use]
pub fn month_calendar(
    car_id: &CarId,
    year: i32,
    month: u32,
    today: NaiveDate,
    bookings: &[Booking],
) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| CalendarDay {
            date,
            past: is_past(date, today),
            booked: is_booked(car_id, date, bookings),
            today: date == today,
        })
        .collect()
}
