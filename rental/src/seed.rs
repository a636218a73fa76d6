//! Demo data used on first start and after a reset.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::rating;
use crate::types::{
    Booking, BookingId, BookingStatus, Car, CarId, CarStatus, Category, Review, ReviewId, Transmission, User,
    UserId, UserRole,
};

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// The demo owner and client
#[must_use]
pub fn users() -> Vec<User> {
    vec![
        User {
            id: UserId::new("u1"),
            name: "John Owner".to_string(),
            email: "owner@test.com".to_string(),
            role: UserRole::Owner,
        },
        User {
            id: UserId::new("u2"),
            name: "Alice Client".to_string(),
            email: "client@test.com".to_string(),
            role: UserRole::Client,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn listing(
    id: &str,
    name: &str,
    model_year: i32,
    price_per_day: u32,
    description: &str,
    image_url: &str,
    status: CarStatus,
    category: Category,
) -> Car {
    Car {
        id: CarId::new(id),
        owner_id: UserId::new("u1"),
        name: name.to_string(),
        model_year,
        price_per_day,
        description: description.to_string(),
        image_url: image_url.to_string(),
        status,
        category,
        transmission: Transmission::Automatic,
        rating: 0.0,
        review_count: 0,
    }
}

/// The demo fleet, with ratings derived from [`reviews`]
#[must_use]
pub fn cars() -> Vec<Car> {
    let reviews = reviews();
    let mut cars = vec![
        listing(
            "c1",
            "Tesla Model 3",
            2023,
            120,
            "Experience the future of driving with this pristine electric sedan. Autopilot enabled.",
            "https://images.unsplash.com/photo-1560958089-b8a1929cea89?auto=format&fit=crop&q=80&w=800",
            CarStatus::Available,
            Category::Sedan,
        ),
        listing(
            "c2",
            "Range Rover Sport",
            2022,
            250,
            "Luxury SUV perfect for family trips or business travel. Unmatched comfort.",
            "https://images.unsplash.com/photo-1606016159991-dfe4f2746ad5?auto=format&fit=crop&q=80&w=800",
            CarStatus::Available,
            Category::Suv,
        ),
        listing(
            "c3",
            "Porsche 911 Carrera",
            2024,
            450,
            "The iconic sports car. Feel the thrill of the road with precision engineering.",
            "https://images.unsplash.com/photo-1503376763036-066120622c74?auto=format&fit=crop&q=80&w=800",
            CarStatus::Booked,
            Category::Sports,
        ),
    ];
    for car in &mut cars {
        rating::apply(car, &reviews);
    }
    cars
}

/// One approved Porsche rental
#[must_use]
pub fn bookings() -> Vec<Booking> {
    vec![Booking {
        id: BookingId::new("b1"),
        car_id: CarId::new("c3"),
        client_id: UserId::new("u2"),
        owner_id: UserId::new("u1"),
        start_date: date(2024, 6, 10),
        end_date: date(2024, 6, 15),
        pickup_location: "LAX Airport".to_string(),
        total_price: 2250,
        status: BookingStatus::Approved,
        created_at: at(2024, 6, 1, 10),
    }]
}

/// The review of that rental
#[must_use]
pub fn reviews() -> Vec<Review> {
    vec![Review {
        id: ReviewId::new("r1"),
        booking_id: BookingId::new("b1"),
        car_id: CarId::new("c3"),
        client_id: UserId::new("u2"),
        rating: 5,
        comment: "Absolute beast of a machine. Clean, fast, and the owner was super helpful!".to_string(),
        created_at: at(2024, 6, 16, 12),
    }]
}
