//! # DriveEasy Testing
//!
//! Testing utilities for reducers and stores.
//!
//! This crate provides:
//! - Deterministic environment implementations (`FixedClock`, `SequentialIdGenerator`)
//! - The Given-When-Then [`ReducerTest`] harness
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use driveeasy_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(RentalReducer::new())
//!     .with_env(test_environment())
//!     .given_state(RentalState::seeded())
//!     .when_action(RentalAction::ApproveBooking { booking_id })
//!     .then_state(|state| assert!(state.last_error.is_none()))
//!     .run();
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use driveeasy_core::environment::{Clock, IdGenerator};


pub use reducer_test::{ReducerTest, assertions};

/// Deterministic implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, NaiveDate, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// `today()` is the UTC calendar day of the fixed instant, so tests do not
    /// depend on the host time zone.
    ///
    /// # Example
    ///
    /// ```
    /// use driveeasy_testing::mocks::FixedClock;
    /// use driveeasy_core::environment::Clock;
    /// use chrono::NaiveDate;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    /// let clock = FixedClock::on(day);
    /// assert_eq!(clock.today(), day);
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// A clock fixed at noon (UTC) of the given day
        #[must_use]
        pub fn on(day: NaiveDate) -> Self {
            let noon = day
                .and_hms_opt(12, 0, 0)
                .unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN));
            Self::new(noon.and_utc())
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }

        fn today(&self) -> NaiveDate {
            self.time.date_naive()
        }
    }

    /// Create a default fixed clock for tests (2024-06-01 12:00:00 UTC)
    ///
    /// Chosen before the seeded booking (2024-06-10..2024-06-15) so seed data
    /// lies in the future.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default())
    }

    /// Predictable identifiers: `{prefix}1`, `{prefix}2`, ...
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Generator producing `id-1`, `id-2`, ...
        #[must_use]
        pub fn new() -> Self {
            Self::with_prefix("id-")
        }

        /// Generator with a custom prefix
        #[must_use]
        pub fn with_prefix(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            format!("{}{n}", self.prefix)
        }
    }

    /// Generator that always returns the same id, for exercising uniqueness checks
    #[derive(Debug, Clone)]
    pub struct RepeatingIdGenerator(pub String);

    impl IdGenerator for RepeatingIdGenerator {
        fn next_id(&self) -> String {
            self.0.clone()
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, RepeatingIdGenerator, SequentialIdGenerator, test_clock};
