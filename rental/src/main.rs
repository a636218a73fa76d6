//! DriveEasy demo
//!
//! Runs a scripted marketplace session through the Store:
//! - Owner signs in and reviews the dashboard
//! - Client quotes and books the first free window of a car
//! - Owner approves the booking
//! - Client reviews the rental and asks DriveBot a question
//!
//! State is loaded from and written to `DRIVEEASY_DATA_DIR`, so repeated runs
//! build on each other. Set `ANTHROPIC_API_KEY` for generated text.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin driveeasy
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Days;
use driveeasy::booking::BookingRequest;
use driveeasy::persistence::{self, FileStore};
use driveeasy::types::{CarId, DateRange, ReviewDraft, UserRole};
use driveeasy::{Config, RentalAction, RentalEnvironment, RentalError, RentalReducer, RentalState};
use driveeasy_core::environment::{Clock, SystemClock, UuidIdGenerator};
use driveeasy_runtime::{Store, StoreError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type RentalStore = Store<RentalState, RentalAction, RentalEnvironment, RentalReducer>;

/// Sends `action`, waits for its effects and returns the rejection, if any
async fn dispatch(store: &RentalStore, action: RentalAction) -> Result<Option<RentalError>, StoreError> {
    store.send(action).await?.wait().await;
    Ok(store.state(|s| s.last_error.clone()).await)
}

async fn login(store: &RentalStore, email: &str, role: UserRole) -> Result<(), StoreError> {
    dispatch(
        store,
        RentalAction::Login {
            email: email.to_string(),
            role,
        },
    )
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.app.log_level).unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(data_dir = %config.storage.data_dir.display(), "Starting DriveEasy");

    let storage = Arc::new(FileStore::new(&config.storage.data_dir));
    let state = persistence::load_state(storage.as_ref()).await;
    let clock = Arc::new(SystemClock);
    let today = clock.today();

    let env = RentalEnvironment::new(
        clock,
        Arc::new(UuidIdGenerator),
        storage,
        Arc::new(config.assistant.build()),
    );
    let store = Store::new(state, RentalReducer::new(), env);

    println!("\n============================================");
    println!("   DriveEasy - Marketplace Demo");
    println!("============================================\n");

    // ========== Owner dashboard ==========

    login(&store, "owner@test.com", UserRole::Owner).await?;
    let (owner_id, stats) = store
        .state(|s| {
            let id = s.current_user.as_ref().map(|u| u.id.clone());
            let stats = id.as_ref().map(|id| s.owner_stats(id));
            (id, stats)
        })
        .await;
    if let Some(stats) = &stats {
        println!("1. Owner dashboard");
        println!("   Fleet: {} cars, {} pending requests", stats.fleet_size, stats.pending_count);
        println!("   Revenue: ${} over {} trips", stats.total_revenue, stats.total_trips);
        println!("   Average rating: {:.1}\n", stats.avg_fleet_rating);
    }
    dispatch(&store, RentalAction::Logout).await?;

    // ========== Client books ==========

    let car_id = CarId::new("c1");
    login(&store, "client@test.com", UserRole::Client).await?;

    let window = store
        .state(|s| {
            (1..=90u64).find_map(|offset| {
                let start = today.checked_add_days(Days::new(offset))?;
                let end = start.checked_add_days(Days::new(2))?;
                let range = DateRange::new(start, end).ok()?;
                s.is_range_available(&car_id, &range, today).then_some(range)
            })
        })
        .await;
    let Some(range) = window else {
        println!("No free window for {car_id} in the next 90 days");
        store.shutdown(config.shutdown_timeout()).await?;
        return Ok(());
    };

    let quote = store.state(|s| s.quote(&car_id, &range)).await?;
    println!("2. Quote for {car_id} on {range}: ${quote}");

    let request = BookingRequest::new(
        car_id.clone(),
        range.start().to_string(),
        range.end().to_string(),
        "SFO Airport",
    );
    if let Some(error) = dispatch(&store, RentalAction::CreateBooking { request }).await? {
        println!("   Booking rejected: {error}");
        store.shutdown(config.shutdown_timeout()).await?;
        return Ok(());
    }
    let Some(booking_id) = store.state(|s| s.bookings.first().map(|b| b.id.clone())).await else {
        return Err("booking was accepted but not stored".into());
    };
    println!("   Requested booking {booking_id} (pending)\n");
    dispatch(&store, RentalAction::Logout).await?;

    // ========== Owner approves ==========

    login(&store, "owner@test.com", UserRole::Owner).await?;
    match dispatch(
        &store,
        RentalAction::ApproveBooking {
            booking_id: booking_id.clone(),
        },
    )
    .await?
    {
        Some(error) => println!("3. Approval failed: {error}\n"),
        None => println!("3. Owner approved {booking_id}\n"),
    }
    dispatch(&store, RentalAction::Logout).await?;

    // ========== Client reviews and chats ==========

    login(&store, "client@test.com", UserRole::Client).await?;
    let review = ReviewDraft {
        booking_id,
        car_id: car_id.clone(),
        rating: 5,
        comment: "Spotless car and a smooth pickup.".to_string(),
    };
    match dispatch(&store, RentalAction::AddReview { review }).await? {
        Some(error) => println!("4. Review rejected: {error}"),
        None => {
            let (rating, count) = store
                .state(|s| s.car(&car_id).map(|c| (c.rating, c.review_count)).unwrap_or_default())
                .await;
            println!("4. Review posted; {car_id} now rated {rating:.1} from {count} reviews");
        },
    }

    let reply = store
        .send_and_wait_for(
            RentalAction::SendChatMessage {
                text: "Which SUVs do you have?".to_string(),
            },
            |action| matches!(action, RentalAction::ChatReplyReceived { .. }),
            Duration::from_secs(30),
        )
        .await;
    match reply {
        Ok(RentalAction::ChatReplyReceived { text }) => println!("   DriveBot: {text}\n"),
        Ok(_) => {},
        Err(error) => tracing::warn!(%error, "No chat reply"),
    }

    // ========== Final dashboard ==========

    if let Some(owner_id) = owner_id {
        let stats = store.state(|s| s.owner_stats(&owner_id)).await;
        println!("5. Owner revenue by month:");
        for (month, revenue) in stats.revenue_by_month.iter().filter(|(_, r)| **r > 0) {
            println!("   {month:>2}: ${revenue}");
        }
    }

    store.shutdown(config.shutdown_timeout()).await?;
    tracing::info!("DriveEasy stopped");
    Ok(())
}
