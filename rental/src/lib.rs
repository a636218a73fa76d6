//! # DriveEasy
//!
//! A peer-to-peer car rental marketplace built on the reducer/effect
//! architecture: owners list cars and approve bookings, clients browse,
//! book date ranges and review completed rentals.
//!
//! The domain lives in pure modules ([`availability`], [`booking`],
//! [`rating`], [`catalog`], [`analytics`]) that [`state::RentalState`]
//! composes. [`reducer::RentalReducer`] turns commands into state changes
//! plus effect descriptions (storage writes and assistant requests) that the
//! runtime `Store` executes.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use driveeasy::persistence::MemoryStore;
//! use driveeasy::reducer::{RentalAction, RentalEnvironment, RentalReducer};
//! use driveeasy::state::RentalState;
//! use driveeasy::types::UserRole;
//! use driveeasy_assistant::GenerativeAssistant;
//! use driveeasy_core::environment::{SystemClock, UuidIdGenerator};
//! use driveeasy_runtime::Store;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let env = RentalEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(UuidIdGenerator),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(GenerativeAssistant::offline()),
//! );
//! let store = Store::new(RentalState::seeded(), RentalReducer::new(), env);
//! store
//!     .send(RentalAction::Login { email: "client@test.com".into(), role: UserRole::Client })
//!     .await?
//!     .wait()
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod availability;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod error;
pub mod persistence;
pub mod rating;
pub mod reducer;
pub mod seed;
pub mod state;
pub mod types;

pub use config::Config;
pub use error::RentalError;
pub use reducer::{AssistantRequest, RentalAction, RentalEnvironment, RentalReducer};
pub use state::RentalState;
