//! Error types for marketplace operations

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{BookingId, BookingStatus, CarId};

/// A rejected marketplace command
///
/// Every variant is a recoverable precondition failure; the reducer records
/// it as `last_error` and leaves the collections untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RentalError {
    /// No start date was supplied
    #[error("Please select a start date")]
    MissingStartDate,

    /// No end date was supplied
    #[error("Please select an end date")]
    MissingEndDate,

    /// End date precedes start date
    #[error("End date {end} is before start date {start}")]
    InvalidRange {
        /// Requested first day
        start: NaiveDate,
        /// Requested last day
        end: NaiveDate,
    },

    /// The range contains a day before today
    #[error("{date} is in the past")]
    PastDate {
        /// First past day found
        date: NaiveDate,
    },

    /// The range overlaps an existing booking
    #[error("Car {car_id} is already booked on {date}")]
    DatesUnavailable {
        /// Requested car
        car_id: CarId,
        /// First occupied day found
        date: NaiveDate,
    },

    /// Text that is not a `YYYY-MM-DD` calendar day
    #[error("Invalid date: {input}")]
    InvalidDate {
        /// Offending input
        input: String,
    },

    /// Car does not exist
    #[error("Car {0} not found")]
    CarNotFound(CarId),

    /// Booking does not exist
    #[error("Booking {0} not found")]
    BookingNotFound(BookingId),

    /// Status change that would revisit a decided booking
    #[error("Booking cannot move from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: BookingStatus,
        /// Requested status
        to: BookingStatus,
    },

    /// Generated identifier already exists in the collection
    #[error("Identifier {0} is already in use")]
    DuplicateId(String),

    /// Booking already has a review
    #[error("Booking {0} has already been reviewed")]
    DuplicateReview(BookingId),

    /// Reviews are only accepted for approved bookings
    #[error("Cannot review a {status} booking")]
    ReviewNotAllowed {
        /// Current booking status
        status: BookingStatus,
    },

    /// Review names a different car than its booking
    #[error("Review is for car {actual} but booking is for car {expected}")]
    ReviewCarMismatch {
        /// Car of the booking
        expected: CarId,
        /// Car named by the review
        actual: CarId,
    },

    /// Only the renting client may review a booking
    #[error("Only the client of a booking may review it")]
    ReviewerMismatch,

    /// Review stars outside 1..=5
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// Daily price must be positive
    #[error("Price per day must be greater than zero")]
    InvalidPrice,

    /// Required text field left blank
    #[error("{field} must not be empty")]
    EmptyField {
        /// Field name
        field: &'static str,
    },

    /// Operation needs a signed-in user
    #[error("You need to log in first")]
    NotLoggedIn,

    /// DriveBot has not answered the previous message yet
    #[error("DriveBot is still replying to your last message")]
    ReplyPending,
}
