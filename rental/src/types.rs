//! Domain types for the rental marketplace.
//!
//! Records serialize with camelCase field names and the enum spellings used by
//! the persisted collections, so stored JSON stays readable by other clients.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RentalError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a user
    UserId
);
string_id!(
    /// Unique identifier for a car listing
    CarId
);
string_id!(
    /// Unique identifier for a booking
    BookingId
);
string_id!(
    /// Unique identifier for a review
    ReviewId
);

/// Marketplace role; fixed for the lifetime of a user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Lists cars and approves bookings
    Owner,
    /// Books cars and writes reviews
    Client,
}

/// A marketplace user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Role
    pub role: UserRole,
}

/// Coarse listing flag shown in the catalog
///
/// Only the browse view looks at it. Bookability is decided by the
/// date-range check in [`crate::availability`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    /// Listed and shown when browsing
    #[default]
    Available,
    /// Hidden from the browse view
    Booked,
}

/// Vehicle category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Sport utility vehicle
    #[serde(rename = "SUV")]
    Suv,
    /// Sedan
    Sedan,
    /// Luxury
    Luxury,
    /// Sports car
    Sports,
}

impl Category {
    /// Every category, in catalog order
    pub const ALL: [Self; 4] = [Self::Suv, Self::Sedan, Self::Luxury, Self::Sports];

    /// Display name, matching the stored spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Suv => "SUV",
            Self::Sedan => "Sedan",
            Self::Luxury => "Luxury",
            Self::Sports => "Sports",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gearbox type; records stored without one read as automatic
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    /// Automatic
    #[default]
    Automatic,
    /// Manual
    Manual,
}

/// A car listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    /// Unique identifier
    pub id: CarId,
    /// Owning user
    pub owner_id: UserId,
    /// Make and model
    pub name: String,
    /// Model year
    pub model_year: i32,
    /// Daily price in whole dollars, always positive
    pub price_per_day: u32,
    /// Listing copy
    pub description: String,
    /// Photo URL
    pub image_url: String,
    /// Catalog flag
    #[serde(default)]
    pub status: CarStatus,
    /// Category
    pub category: Category,
    /// Gearbox
    #[serde(default)]
    pub transmission: Transmission,
    /// Mean review rating rounded to one decimal, 0 without reviews
    #[serde(default)]
    pub rating: f64,
    /// Number of reviews
    #[serde(default)]
    pub review_count: u32,
}

/// Owner-editable attributes of a listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDraft {
    /// Make and model
    pub name: String,
    /// Model year
    pub model_year: i32,
    /// Daily price in whole dollars
    pub price_per_day: u32,
    /// Listing copy
    pub description: String,
    /// Photo URL
    pub image_url: String,
    /// Catalog flag
    pub status: CarStatus,
    /// Category
    pub category: Category,
    /// Gearbox
    pub transmission: Transmission,
}

impl CarDraft {
    /// Checks the fields every listing needs
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::EmptyField`] for a blank name and
    /// [`RentalError::InvalidPrice`] for a zero price.
    pub fn validate(&self) -> Result<(), RentalError> {
        if self.name.trim().is_empty() {
            return Err(RentalError::EmptyField { field: "name" });
        }
        if self.price_per_day == 0 {
            return Err(RentalError::InvalidPrice);
        }
        Ok(())
    }

    /// Builds a fresh listing with no reviews
    #[must_use]
    pub fn into_car(self, id: CarId, owner_id: UserId) -> Car {
        Car {
            id,
            owner_id,
            name: self.name,
            model_year: self.model_year,
            price_per_day: self.price_per_day,
            description: self.description,
            image_url: self.image_url,
            status: self.status,
            category: self.category,
            transmission: self.transmission,
            rating: 0.0,
            review_count: 0,
        }
    }
}

/// Booking lifecycle: PENDING, then APPROVED or REJECTED, never back
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Awaiting the owner
    Pending,
    /// Accepted by the owner
    Approved,
    /// Declined by the owner
    Rejected,
}

impl BookingStatus {
    /// Whether a booking in this status occupies its days
    #[must_use]
    pub const fn blocks_dates(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        })
    }
}

/// A reservation of a car for an inclusive range of calendar days
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique identifier
    pub id: BookingId,
    /// Booked car
    pub car_id: CarId,
    /// Renting user
    pub client_id: UserId,
    /// Car owner at creation time
    pub owner_id: UserId,
    /// First day, inclusive
    pub start_date: NaiveDate,
    /// Last day, inclusive
    pub end_date: NaiveDate,
    /// Where the client collects the car
    pub pickup_location: String,
    /// Price frozen at creation: days × daily price
    pub total_price: u64,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Creation instant
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// The booked days
    #[must_use]
    pub const fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Whether this booking occupies `day` on its car
    #[must_use]
    pub fn occupies(&self, day: NaiveDate) -> bool {
        self.status.blocks_dates() && self.start_date <= day && day <= self.end_date
    }
}

/// A client's review of a completed rental
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique identifier
    pub id: ReviewId,
    /// Reviewed booking; at most one review per booking
    pub booking_id: BookingId,
    /// Car of that booking
    pub car_id: CarId,
    /// Author
    pub client_id: UserId,
    /// Stars, 1 to 5
    pub rating: u8,
    /// Free text
    pub comment: String,
    /// Creation instant
    pub created_at: DateTime<Utc>,
}

/// A client's review form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    /// Reviewed booking
    pub booking_id: BookingId,
    /// Car of that booking
    pub car_id: CarId,
    /// Stars, 1 to 5
    pub rating: u8,
    /// Free text
    pub comment: String,
}

/// An inclusive range of calendar days with `start <= end`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::InvalidRange`] when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RentalError> {
        if end < start {
            return Err(RentalError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses optional `YYYY-MM-DD` endpoints as supplied by a form
    ///
    /// Blank strings count as missing. Parsing is purely calendar based.
    ///
    /// # Errors
    ///
    /// Returns `MissingStartDate`/`MissingEndDate`, `InvalidDate` for text
    /// that is not a calendar date, or `InvalidRange` when end precedes start.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, RentalError> {
        let start = start
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RentalError::MissingStartDate)?;
        let end = end
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RentalError::MissingEndDate)?;
        Self::new(parse_day(start)?, parse_day(end)?)
    }

    /// First day
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, counting both endpoints
    #[must_use]
    pub fn day_count(&self) -> u64 {
        // end >= start, so the difference is never negative
        u64::try_from((self.end - self.start).num_days()).unwrap_or(0) + 1
    }

    /// Every day of the range in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Whether `day` falls inside the range
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parses one `YYYY-MM-DD` calendar day
///
/// # Errors
///
/// Returns [`RentalError::InvalidDate`] when `input` is not a valid day.
pub fn parse_day(input: &str) -> Result<NaiveDate, RentalError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| RentalError::InvalidDate {
        input: input.to_string(),
    })
}

/// A booking as shown to its owner, joined with car and client details
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithDetails {
    /// The booking itself
    #[serde(flatten)]
    pub booking: Booking,
    /// Car name, or "Unknown Car" if the listing is gone
    pub car_name: String,
    /// Car photo, or empty
    pub car_image: String,
    /// Client name, or "Guest Client"
    pub client_name: String,
    /// Client email, or "No email provided"
    pub client_email: String,
    /// Whether the client has reviewed this booking
    pub has_review: bool,
}
