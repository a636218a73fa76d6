//! Application state: the marketplace collections and the operations on them.
//!
//! Every mutating operation validates first and changes nothing when it
//! returns an error. Time and identifiers are passed in, so operations are
//! deterministic and need no I/O.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use driveeasy_assistant::{CHAT_GREETING, ChatTurn};

use crate::analytics::OwnerStats;
use crate::availability::{self, CalendarDay};
use crate::booking::{self, BookingRequest};
use crate::catalog::{self, CarFilter};
use crate::error::RentalError;
use crate::rating;
use crate::seed;
use crate::types::{
    Booking, BookingId, BookingStatus, BookingWithDetails, Car, CarDraft, CarId, DateRange, Review, ReviewDraft,
    ReviewId, User, UserId, UserRole,
};

/// Progress of a promo video for one car
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoStatus {
    /// Generation in flight
    Generating,
    /// Finished; URI of the video
    Ready(String),
    /// Generation failed
    Failed(String),
}

/// Results of assistant requests, kept apart from the marketplace data
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantState {
    /// Last generated listing description
    pub draft_description: Option<String>,
    /// Description request in flight
    pub describing: bool,
    /// DriveBot transcript, opening with the greeting
    pub chat: Vec<ChatTurn>,
    /// Chat reply in flight
    pub chat_pending: bool,
    /// Video scripts per car, used as the default video prompt
    pub video_scripts: HashMap<CarId, String>,
    /// Promo videos per car
    pub videos: HashMap<CarId, VideoStatus>,
}

impl Default for AssistantState {
    fn default() -> Self {
        Self {
            draft_description: None,
            describing: false,
            chat: vec![ChatTurn::model(CHAT_GREETING)],
            chat_pending: false,
            video_scripts: HashMap::new(),
            videos: HashMap::new(),
        }
    }
}

/// The marketplace
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RentalState {
    /// Signed-in user
    pub current_user: Option<User>,
    /// User directory
    pub users: Vec<User>,
    /// Fleet, newest listing first
    pub cars: Vec<Car>,
    /// Bookings, newest first
    pub bookings: Vec<Booking>,
    /// Reviews in submission order
    pub reviews: Vec<Review>,
    /// Favorite cars in the order they were added
    pub favorites: Vec<CarId>,
    /// Why the last command was rejected, cleared by the next success
    pub last_error: Option<RentalError>,
    /// Assistant results
    pub assistant: AssistantState,
}

impl RentalState {
    /// State populated with the demo data
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            users: seed::users(),
            cars: seed::cars(),
            bookings: seed::bookings(),
            reviews: seed::reviews(),
            ..Self::default()
        }
    }

    // ========== Lookups ==========

    /// Car by id
    #[must_use]
    pub fn car(&self, id: &CarId) -> Option<&Car> {
        self.cars.iter().find(|c| &c.id == id)
    }

    /// Booking by id
    #[must_use]
    pub fn booking(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| &b.id == id)
    }

    /// User by id; the signed-in user shadows the directory entry
    #[must_use]
    pub fn user_by_id(&self, id: &UserId) -> Option<&User> {
        self.current_user
            .as_ref()
            .filter(|u| &u.id == id)
            .or_else(|| self.users.iter().find(|u| &u.id == id))
    }

    /// Owner by id
    #[must_use]
    pub fn owner_by_id(&self, id: &UserId) -> Option<&User> {
        self.user_by_id(id).filter(|u| u.role == UserRole::Owner)
    }

    fn require_user(&self) -> Result<&User, RentalError> {
        self.current_user.as_ref().ok_or(RentalError::NotLoggedIn)
    }

    fn require_car(&self, id: &CarId) -> Result<&Car, RentalError> {
        self.car(id).ok_or_else(|| RentalError::CarNotFound(id.clone()))
    }

    fn booking_mut(&mut self, id: &BookingId) -> Result<&mut Booking, RentalError> {
        self.bookings
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| RentalError::BookingNotFound(id.clone()))
    }

    // ========== Session ==========

    /// Signs in as the directory user with this email and role, or as the
    /// demo user of that role using the given email
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::EmptyField`] for a blank email.
    pub fn login(&mut self, email: &str, role: UserRole) -> Result<&User, RentalError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(RentalError::EmptyField { field: "email" });
        }
        let user = self
            .users
            .iter()
            .find(|u| u.email == email && u.role == role)
            .cloned()
            .unwrap_or_else(|| {
                let (id, name) = match role {
                    UserRole::Owner => ("u1", "John Owner"),
                    UserRole::Client => ("u2", "Alice Client"),
                };
                User {
                    id: UserId::new(id),
                    name: name.to_string(),
                    email: email.to_string(),
                    role,
                }
            });
        Ok(self.current_user.insert(user))
    }

    /// Signs out
    pub fn logout(&mut self) {
        self.current_user = None;
    }

    // ========== Fleet ==========

    /// Lists a new car for the signed-in user, ahead of existing listings
    ///
    /// # Errors
    ///
    /// `NotLoggedIn`, `EmptyField`, `InvalidPrice`, or `DuplicateId` when `id`
    /// is taken.
    pub fn add_car(&mut self, draft: CarDraft, id: CarId) -> Result<&Car, RentalError> {
        let owner_id = self.require_user()?.id.clone();
        draft.validate()?;
        if self.car(&id).is_some() {
            return Err(RentalError::DuplicateId(id.to_string()));
        }
        self.cars.insert(0, draft.into_car(id, owner_id));
        Ok(&self.cars[0])
    }

    /// Replaces the editable attributes of a car
    ///
    /// Identity, owner and the review aggregate are kept from the stored record.
    ///
    /// # Errors
    ///
    /// `CarNotFound`, `EmptyField` or `InvalidPrice`.
    pub fn update_car(&mut self, id: &CarId, draft: CarDraft) -> Result<&Car, RentalError> {
        draft.validate()?;
        let car = self
            .cars
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| RentalError::CarNotFound(id.clone()))?;
        let updated = draft.into_car(car.id.clone(), car.owner_id.clone());
        *car = Car {
            rating: car.rating,
            review_count: car.review_count,
            ..updated
        };
        Ok(car)
    }

    /// Removes a car together with its bookings, reviews and favorite entry
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::CarNotFound`] for an unknown car.
    pub fn delete_car(&mut self, id: &CarId) -> Result<Car, RentalError> {
        let index = self
            .cars
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| RentalError::CarNotFound(id.clone()))?;
        let car = self.cars.remove(index);
        self.bookings.retain(|b| &b.car_id != id);
        self.reviews.retain(|r| &r.car_id != id);
        self.favorites.retain(|f| f != id);
        Ok(car)
    }

    // ========== Favorites ==========

    /// Adds or removes a favorite; returns whether the car is now a favorite
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::CarNotFound`] when adding an unknown car.
    pub fn toggle_favorite(&mut self, id: &CarId) -> Result<bool, RentalError> {
        if let Some(index) = self.favorites.iter().position(|f| f == id) {
            self.favorites.remove(index);
            return Ok(false);
        }
        self.require_car(id)?;
        self.favorites.push(id.clone());
        Ok(true)
    }

    // ========== Bookings ==========

    /// Books a car for the signed-in user
    ///
    /// # Errors
    ///
    /// `NotLoggedIn`, `CarNotFound`, `DuplicateId`, or any error of
    /// [`booking::create`].
    pub fn create_booking(
        &mut self,
        request: &BookingRequest,
        today: NaiveDate,
        id: BookingId,
        created_at: DateTime<Utc>,
    ) -> Result<&Booking, RentalError> {
        let client_id = self.require_user()?.id.clone();
        let car = self.require_car(&request.car_id)?;
        if self.booking(&id).is_some() {
            return Err(RentalError::DuplicateId(id.to_string()));
        }
        let booking = booking::create(car, &client_id, request, &self.bookings, today, id, created_at)?;
        self.bookings.insert(0, booking);
        Ok(&self.bookings[0])
    }

    /// Approves a booking; returns whether the status changed
    ///
    /// # Errors
    ///
    /// `BookingNotFound` or `InvalidTransition`.
    pub fn approve_booking(&mut self, id: &BookingId) -> Result<bool, RentalError> {
        booking::approve(self.booking_mut(id)?)
    }

    /// Rejects a booking; returns whether the status changed
    ///
    /// # Errors
    ///
    /// `BookingNotFound` or `InvalidTransition`.
    pub fn reject_booking(&mut self, id: &BookingId) -> Result<bool, RentalError> {
        booking::reject(self.booking_mut(id)?)
    }

    // ========== Reviews ==========

    /// Records the signed-in client's review of an approved booking and
    /// refreshes the car's rating
    ///
    /// # Errors
    ///
    /// `BookingNotFound`, `CarNotFound`, `ReviewCarMismatch`,
    /// `ReviewNotAllowed`, `NotLoggedIn`, `ReviewerMismatch`, `InvalidRating`,
    /// `DuplicateReview` or `DuplicateId`.
    pub fn add_review(
        &mut self,
        draft: ReviewDraft,
        id: ReviewId,
        created_at: DateTime<Utc>,
    ) -> Result<&Review, RentalError> {
        let booking = self
            .booking(&draft.booking_id)
            .ok_or_else(|| RentalError::BookingNotFound(draft.booking_id.clone()))?;
        self.require_car(&draft.car_id)?;
        if booking.car_id != draft.car_id {
            return Err(RentalError::ReviewCarMismatch {
                expected: booking.car_id.clone(),
                actual: draft.car_id,
            });
        }
        if booking.status != BookingStatus::Approved {
            return Err(RentalError::ReviewNotAllowed { status: booking.status });
        }
        let client_id = self.require_user()?.id.clone();
        if booking.client_id != client_id {
            return Err(RentalError::ReviewerMismatch);
        }
        if !(1..=5).contains(&draft.rating) {
            return Err(RentalError::InvalidRating(draft.rating));
        }
        if catalog::has_review(&self.reviews, &draft.booking_id) {
            return Err(RentalError::DuplicateReview(draft.booking_id));
        }
        if self.reviews.iter().any(|r| r.id == id) {
            return Err(RentalError::DuplicateId(id.to_string()));
        }

        self.reviews.push(Review {
            id,
            booking_id: draft.booking_id,
            car_id: draft.car_id.clone(),
            client_id,
            rating: draft.rating,
            comment: draft.comment.trim().to_string(),
            created_at,
        });
        if let Some(car) = self.cars.iter_mut().find(|c| c.id == draft.car_id) {
            rating::apply(car, &self.reviews);
        }
        Ok(&self.reviews[self.reviews.len() - 1])
    }

    // ========== Maintenance ==========

    /// Restores the demo data and signs out; assistant results are kept
    pub fn reset(&mut self) {
        let assistant = std::mem::take(&mut self.assistant);
        *self = Self {
            assistant,
            ..Self::seeded()
        };
    }

    // ========== Queries ==========

    /// Cars passing `filter`
    #[must_use]
    pub fn filter_cars(&self, filter: &CarFilter) -> Vec<&Car> {
        catalog::filter_cars(&self.cars, &self.favorites, filter)
    }

    /// Whether `id` is a favorite
    #[must_use]
    pub fn is_favorite(&self, id: &CarId) -> bool {
        self.favorites.contains(id)
    }

    /// A client's bookings, newest first
    #[must_use]
    pub fn client_bookings(&self, client_id: &UserId) -> Vec<&Booking> {
        catalog::client_bookings(&self.bookings, client_id)
    }

    /// An owner's incoming bookings with car and client details
    #[must_use]
    pub fn owner_bookings(&self, owner_id: &UserId) -> Vec<BookingWithDetails> {
        let mut directory = self.users.clone();
        if let Some(user) = &self.current_user {
            directory.retain(|u| u.id != user.id);
            directory.push(user.clone());
        }
        catalog::owner_bookings(&self.bookings, &self.cars, &directory, &self.reviews, owner_id)
    }

    /// Owner dashboard figures
    #[must_use]
    pub fn owner_stats(&self, owner_id: &UserId) -> OwnerStats {
        OwnerStats::compute(owner_id, &self.cars, &self.bookings)
    }

    /// Whether a booking has been reviewed
    #[must_use]
    pub fn has_review(&self, booking_id: &BookingId) -> bool {
        catalog::has_review(&self.reviews, booking_id)
    }

    /// The review of a booking
    #[must_use]
    pub fn review_for_booking(&self, booking_id: &BookingId) -> Option<&Review> {
        catalog::review_for_booking(&self.reviews, booking_id)
    }

    /// Whether every day of `range` is free for the car
    #[must_use]
    pub fn is_range_available(&self, car_id: &CarId, range: &DateRange, today: NaiveDate) -> bool {
        availability::is_range_available(car_id, range, today, &self.bookings)
    }

    /// Calendar grid of a month for one car
    #[must_use]
    pub fn month_calendar(&self, car_id: &CarId, year: i32, month: u32, today: NaiveDate) -> Vec<CalendarDay> {
        availability::month_calendar(car_id, year, month, today, &self.bookings)
    }

    /// Every booked day of a car
    #[must_use]
    pub fn blackout_dates(&self, car_id: &CarId) -> BTreeSet<NaiveDate> {
        availability::blackout_dates(car_id, &self.bookings)
    }

    /// Price preview for renting a car over `range`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::CarNotFound`] for an unknown car.
    pub fn quote(&self, car_id: &CarId, range: &DateRange) -> Result<u64, RentalError> {
        Ok(availability::quote(self.require_car(car_id)?, range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CarStatus, Category, Transmission, parse_day};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        parse_day("2024-06-01").unwrap()
    }

    fn draft(name: &str, price: u32) -> CarDraft {
        CarDraft {
            name: name.to_string(),
            model_year: 2021,
            price_per_day: price,
            description: "Zippy hatchback".to_string(),
            image_url: String::new(),
            status: CarStatus::Available,
            category: Category::Sedan,
            transmission: Transmission::Manual,
        }
    }

    fn as_client() -> RentalState {
        let mut state = RentalState::seeded();
        state.login("client@test.com", UserRole::Client).unwrap();
        state
    }

    #[test]
    fn login_prefers_directory_user() {
        let mut state = RentalState::seeded();
        let user = state.login("owner@test.com", UserRole::Owner).unwrap().clone();
        assert_eq!(user, seed::users()[0]);

        let guest = state.login("someone@else.com", UserRole::Client).unwrap().clone();
        assert_eq!(guest.id.as_str(), "u2");
        assert_eq!(guest.name, "Alice Client");
        assert_eq!(guest.email, "someone@else.com");
        assert_eq!(state.user_by_id(&UserId::new("u2")).unwrap().email, "someone@else.com");

        state.logout();
        assert!(state.current_user.is_none());
        assert_eq!(state.login("  ", UserRole::Owner), Err(RentalError::EmptyField { field: "email" }));
    }

    #[test]
    fn owner_lookup_checks_role() {
        let state = RentalState::seeded();
        assert_eq!(state.owner_by_id(&UserId::new("u1")).unwrap().name, "John Owner");
        assert!(state.owner_by_id(&UserId::new("u2")).is_none());
    }

    #[test]
    fn add_car_needs_login_and_goes_first() {
        let mut state = RentalState::seeded();
        assert_eq!(
            state.add_car(draft("Mini", 60), CarId::new("c4")).unwrap_err(),
            RentalError::NotLoggedIn
        );

        state.login("owner@test.com", UserRole::Owner).unwrap();
        let car = state.add_car(draft("Mini", 60), CarId::new("c4")).unwrap();
        assert_eq!(car.owner_id.as_str(), "u1");
        assert_eq!(car.review_count, 0);
        assert_eq!(state.cars[0].id.as_str(), "c4");

        assert_eq!(
            state.add_car(draft("Mini", 60), CarId::new("c4")).unwrap_err(),
            RentalError::DuplicateId("c4".to_string())
        );
        assert_eq!(state.add_car(draft("Mini", 0), CarId::new("c5")).unwrap_err(), RentalError::InvalidPrice);
        assert_eq!(state.cars.len(), 4);
    }

    #[test]
    fn update_car_keeps_identity_and_aggregate() {
        let mut state = RentalState::seeded();
        let c3 = CarId::new("c3");
        let car = state.update_car(&c3, draft("Porsche 911 Turbo", 500)).unwrap();
        assert_eq!(car.name, "Porsche 911 Turbo");
        assert_eq!(car.price_per_day, 500);
        assert_eq!(car.owner_id.as_str(), "u1");
        assert_eq!(car.review_count, 1);

        assert!(matches!(
            state.update_car(&CarId::new("nope"), draft("X", 1)),
            Err(RentalError::CarNotFound(_))
        ));
    }

    #[test]
    fn delete_car_cascades() {
        let mut state = as_client();
        let c3 = CarId::new("c3");
        state.toggle_favorite(&c3).unwrap();

        state.delete_car(&c3).unwrap();
        assert!(state.car(&c3).is_none());
        assert!(state.bookings.is_empty());
        assert!(state.reviews.is_empty());
        assert!(state.favorites.is_empty());
        assert!(matches!(state.delete_car(&c3), Err(RentalError::CarNotFound(_))));
    }

    #[test]
    fn favorites_toggle() {
        let mut state = RentalState::seeded();
        let c1 = CarId::new("c1");
        assert_eq!(state.toggle_favorite(&c1), Ok(true));
        assert!(state.is_favorite(&c1));
        assert_eq!(state.toggle_favorite(&c1), Ok(false));
        assert!(matches!(
            state.toggle_favorite(&CarId::new("ghost")),
            Err(RentalError::CarNotFound(_))
        ));
    }

    #[test]
    fn booking_goes_first_and_blocks_its_days() {
        let mut state = as_client();
        let request = BookingRequest::new("c1", "2024-06-20", "2024-06-22", "SFO");
        let booking = state
            .create_booking(&request, today(), BookingId::new("b2"), now())
            .unwrap();
        assert_eq!(booking.total_price, 360);
        assert_eq!(booking.client_id.as_str(), "u2");
        assert_eq!(state.bookings[0].id.as_str(), "b2");

        let overlapping = BookingRequest::new("c1", "2024-06-22", "2024-06-23", "SFO");
        assert!(matches!(
            state.create_booking(&overlapping, today(), BookingId::new("b3"), now()),
            Err(RentalError::DatesUnavailable { .. })
        ));
        assert!(matches!(
            state.create_booking(&request, today(), BookingId::new("b2"), now()),
            Err(RentalError::DuplicateId(_))
        ));
        assert_eq!(state.bookings.len(), 2);
    }

    #[test]
    fn booking_unknown_car_or_without_login_fails() {
        let mut state = RentalState::seeded();
        let request = BookingRequest::new("c1", "2024-06-20", "2024-06-22", "SFO");
        assert!(matches!(
            state.create_booking(&request, today(), BookingId::new("b2"), now()),
            Err(RentalError::NotLoggedIn)
        ));

        state.login("client@test.com", UserRole::Client).unwrap();
        let request = BookingRequest::new("zz", "2024-06-20", "2024-06-22", "SFO");
        assert!(matches!(
            state.create_booking(&request, today(), BookingId::new("b2"), now()),
            Err(RentalError::CarNotFound(_))
        ));
    }

    #[test]
    fn approve_and_reject_unknown_booking() {
        let mut state = RentalState::seeded();
        let missing = BookingId::new("missing");
        assert_eq!(state.approve_booking(&missing), Err(RentalError::BookingNotFound(missing.clone())));
        assert_eq!(state.reject_booking(&missing), Err(RentalError::BookingNotFound(missing)));
        assert_eq!(state.approve_booking(&BookingId::new("b1")), Ok(false));
    }

    fn approved_c1_booking(state: &mut RentalState) -> BookingId {
        let request = BookingRequest::new("c1", "2024-06-20", "2024-06-22", "SFO");
        let id = state
            .create_booking(&request, today(), BookingId::new("b2"), now())
            .unwrap()
            .id
            .clone();
        state.approve_booking(&id).unwrap();
        id
    }

    #[test]
    fn review_updates_car_rating() {
        let mut state = as_client();
        let booking_id = approved_c1_booking(&mut state);
        let review = ReviewDraft {
            booking_id: booking_id.clone(),
            car_id: CarId::new("c1"),
            rating: 4,
            comment: " Smooth ride ".to_string(),
        };
        state.add_review(review.clone(), ReviewId::new("r2"), now()).unwrap();

        let car = state.car(&CarId::new("c1")).unwrap();
        assert_eq!(car.review_count, 1);
        assert!((car.rating - 4.0).abs() < f64::EPSILON);
        assert_eq!(state.review_for_booking(&booking_id).unwrap().comment, "Smooth ride");

        assert_eq!(
            state.add_review(review, ReviewId::new("r3"), now()).unwrap_err(),
            RentalError::DuplicateReview(booking_id)
        );
    }

    #[test]
    fn review_rules() {
        let mut state = as_client();
        let booking_id = approved_c1_booking(&mut state);
        let base = ReviewDraft {
            booking_id: booking_id.clone(),
            car_id: CarId::new("c1"),
            rating: 5,
            comment: String::new(),
        };

        let wrong_car = ReviewDraft {
            car_id: CarId::new("c2"),
            ..base.clone()
        };
        assert!(matches!(
            state.add_review(wrong_car, ReviewId::new("r9"), now()),
            Err(RentalError::ReviewCarMismatch { .. })
        ));

        let ghost_car = ReviewDraft {
            car_id: CarId::new("ghost"),
            ..base.clone()
        };
        assert!(matches!(
            state.add_review(ghost_car, ReviewId::new("r9"), now()),
            Err(RentalError::CarNotFound(_))
        ));

        let zero = ReviewDraft {
            rating: 0,
            ..base.clone()
        };
        assert_eq!(
            state.add_review(zero, ReviewId::new("r9"), now()).unwrap_err(),
            RentalError::InvalidRating(0)
        );

        state.login("owner@test.com", UserRole::Owner).unwrap();
        assert_eq!(
            state.add_review(base.clone(), ReviewId::new("r9"), now()).unwrap_err(),
            RentalError::ReviewerMismatch
        );

        state.login("client@test.com", UserRole::Client).unwrap();
        assert_eq!(
            state.add_review(base, ReviewId::new("r1"), now()).unwrap_err(),
            RentalError::DuplicateId("r1".to_string())
        );
        assert_eq!(state.reviews.len(), 1);
    }

    #[test]
    fn pending_booking_cannot_be_reviewed() {
        let mut state = as_client();
        let request = BookingRequest::new("c2", "2024-06-20", "2024-06-22", "SFO");
        state.create_booking(&request, today(), BookingId::new("b2"), now()).unwrap();
        let review = ReviewDraft {
            booking_id: BookingId::new("b2"),
            car_id: CarId::new("c2"),
            rating: 5,
            comment: String::new(),
        };
        assert_eq!(
            state.add_review(review, ReviewId::new("r2"), now()).unwrap_err(),
            RentalError::ReviewNotAllowed {
                status: BookingStatus::Pending
            }
        );
    }

    #[test]
    fn reset_restores_seed_and_signs_out() {
        let mut state = as_client();
        state.toggle_favorite(&CarId::new("c1")).unwrap();
        state.delete_car(&CarId::new("c2")).unwrap();
        state.assistant.draft_description = Some("kept".to_string());

        state.reset();
        assert!(state.current_user.is_none());
        assert!(state.favorites.is_empty());
        assert_eq!(state.cars, seed::cars());
        assert_eq!(state.assistant.draft_description.as_deref(), Some("kept"));
    }

    #[test]
    fn quote_and_calendar_queries() {
        let state = RentalState::seeded();
        let range = DateRange::parse(Some("2024-06-16"), Some("2024-06-17")).unwrap();
        assert_eq!(state.quote(&CarId::new("c3"), &range), Ok(900));
        assert!(state.is_range_available(&CarId::new("c3"), &range, today()));
        assert_eq!(state.blackout_dates(&CarId::new("c3")).len(), 6);
        assert_eq!(state.month_calendar(&CarId::new("c3"), 2024, 6, today()).len(), 30);
    }
}
