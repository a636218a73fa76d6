//! End-to-end marketplace flows through the Store runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use driveeasy::booking::BookingRequest;
use driveeasy::persistence::{self, FileStore, KeyValueStore, MemoryStore, StorageError, StorageKey};
use driveeasy::types::{BookingStatus, CarId, Category, ReviewDraft, UserRole};
use driveeasy::{AssistantRequest, RentalAction, RentalEnvironment, RentalError, RentalReducer, RentalState};
use driveeasy_assistant::prompts::{CHAT_FALLBACK, description_fallback};
use driveeasy_assistant::{Assistant, AssistantError, ChatTurn, GenerativeAssistant, VideoRequest};
use driveeasy_runtime::Store;
use driveeasy_testing::{SequentialIdGenerator, test_clock};
use futures::future::{BoxFuture, FutureExt};

type RentalStore = Store<RentalState, RentalAction, RentalEnvironment, RentalReducer>;

fn store_with(storage: Arc<dyn KeyValueStore>, assistant: Arc<dyn Assistant>, state: RentalState) -> RentalStore {
    let env = RentalEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialIdGenerator::with_prefix("id")),
        storage,
        assistant,
    );
    Store::new(state, RentalReducer::new(), env)
}

async fn run(store: &RentalStore, action: RentalAction) -> Option<RentalError> {
    store.send(action).await.unwrap().wait().await;
    store.state(|s| s.last_error.clone()).await
}

async fn login(store: &RentalStore, email: &str, role: UserRole) {
    let error = run(
        store,
        RentalAction::Login {
            email: email.to_string(),
            role,
        },
    )
    .await;
    assert!(error.is_none());
}

#[tokio::test]
async fn booking_lifecycle_is_persisted() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_with(storage.clone(), Arc::new(GenerativeAssistant::offline()), RentalState::seeded());

    login(&store, "client@test.com", UserRole::Client).await;
    let request = BookingRequest::new("c2", "2024-06-20", "2024-06-23", "Downtown");
    assert!(run(&store, RentalAction::CreateBooking { request }).await.is_none());

    let booking = store.state(|s| s.bookings[0].clone()).await;
    assert_eq!(booking.id.as_str(), "id1");
    assert_eq!(booking.total_price, 1000);
    assert_eq!(booking.owner_id.as_str(), "u1");

    login(&store, "owner@test.com", UserRole::Owner).await;
    let approve = RentalAction::ApproveBooking {
        booking_id: booking.id.clone(),
    };
    assert!(run(&store, approve).await.is_none());

    login(&store, "client@test.com", UserRole::Client).await;
    let review = ReviewDraft {
        booking_id: booking.id.clone(),
        car_id: CarId::new("c2"),
        rating: 4,
        comment: "Comfortable".to_string(),
    };
    assert!(run(&store, RentalAction::AddReview { review }).await.is_none());

    let (rating, count) = store
        .state(|s| s.car(&CarId::new("c2")).map(|c| (c.rating, c.review_count)))
        .await
        .unwrap();
    assert!((rating - 4.0).abs() < f64::EPSILON);
    assert_eq!(count, 1);

    let reloaded = persistence::load_state(storage.as_ref()).await;
    let live = store.state(Clone::clone).await;
    assert_eq!(reloaded.bookings, live.bookings);
    assert_eq!(reloaded.reviews, live.reviews);
    assert_eq!(reloaded.cars, live.cars);
    assert_eq!(reloaded.current_user, live.current_user);
    assert_eq!(reloaded.bookings[0].status, BookingStatus::Approved);
}

/// Store whose first bookings write is slow
#[derive(Default)]
struct SlowBookings {
    inner: MemoryStore,
    delayed: AtomicBool,
}

impl KeyValueStore for SlowBookings {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        self.inner.get(key)
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            if key == StorageKey::Bookings.as_str() && !self.delayed.swap(true, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            self.inner.set(key, value).await
        }
        .boxed()
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        self.inner.remove(key)
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        self.inner.clear()
    }
}

#[tokio::test]
async fn slow_write_is_not_overtaken_by_later_command() {
    let storage = Arc::new(SlowBookings::default());
    let store = store_with(storage.clone(), Arc::new(GenerativeAssistant::offline()), RentalState::seeded());
    login(&store, "client@test.com", UserRole::Client).await;

    let mut created = store
        .send(RentalAction::CreateBooking {
            request: BookingRequest::new("c2", "2024-06-20", "2024-06-23", "Downtown"),
        })
        .await
        .unwrap();
    let mut approved = store
        .send(RentalAction::ApproveBooking {
            booking_id: "id1".into(),
        })
        .await
        .unwrap();
    created.wait().await;
    approved.wait().await;

    let live = store.state(|s| s.bookings.clone()).await;
    let reloaded = persistence::load_state(storage.as_ref()).await;
    assert_eq!(live[0].status, BookingStatus::Approved);
    assert_eq!(reloaded.bookings, live);
}

#[tokio::test]
async fn reset_is_not_undone_by_slow_write() {
    let storage = Arc::new(SlowBookings::default());
    let store = store_with(storage.clone(), Arc::new(GenerativeAssistant::offline()), RentalState::seeded());
    login(&store, "client@test.com", UserRole::Client).await;

    let _created = store
        .send(RentalAction::CreateBooking {
            request: BookingRequest::new("c2", "2024-06-20", "2024-06-23", "Downtown"),
        })
        .await
        .unwrap();
    assert!(run(&store, RentalAction::ResetData).await.is_none());
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    let reloaded = persistence::load_state(storage.as_ref()).await;
    assert_eq!(reloaded, RentalState::seeded());
}

#[tokio::test]
async fn rejected_command_leaves_storage_untouched() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_with(storage.clone(), Arc::new(GenerativeAssistant::offline()), RentalState::seeded());

    let request = BookingRequest::new("c1", "2024-06-20", "2024-06-21", "SFO");
    let error = run(&store, RentalAction::CreateBooking { request }).await;

    assert_eq!(error, Some(RentalError::NotLoggedIn));
    assert!(storage.is_empty().await);
}

#[tokio::test]
async fn reset_rewrites_file_store_with_demo_data() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()));
    let store = store_with(storage.clone(), Arc::new(GenerativeAssistant::offline()), RentalState::seeded());

    login(&store, "client@test.com", UserRole::Client).await;
    run(&store, RentalAction::ToggleFavorite { car_id: CarId::new("c1") }).await;
    assert!(storage.get(StorageKey::User.as_str()).await.unwrap().is_some());

    assert!(run(&store, RentalAction::ResetData).await.is_none());

    assert!(storage.get(StorageKey::User.as_str()).await.unwrap().is_none());
    let reloaded = persistence::load_state(storage.as_ref()).await;
    assert_eq!(reloaded, RentalState::seeded());
}

#[tokio::test]
async fn offline_assistant_answers_with_fallbacks() {
    let store = store_with(
        Arc::new(MemoryStore::new()),
        Arc::new(GenerativeAssistant::offline()),
        RentalState::seeded(),
    );

    let description = store
        .send_and_wait_for(
            RentalAction::GenerateDescription {
                name: "Tesla Model 3".to_string(),
                model_year: 2023,
                category: Category::Sedan,
            },
            |a| matches!(a, RentalAction::DescriptionGenerated { .. }),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert_eq!(
        description,
        RentalAction::DescriptionGenerated {
            text: description_fallback("Tesla Model 3", 2023),
        }
    );

    store
        .send_and_wait_for(
            RentalAction::SendChatMessage {
                text: "Hello".to_string(),
            },
            |a| matches!(a, RentalAction::ChatReplyReceived { .. }),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    // feedback actions are applied after they are broadcast
    store.shutdown(Duration::from_secs(5)).await.unwrap();

    let state = store.state(Clone::clone).await;
    assert_eq!(state.assistant.chat.len(), 3);
    assert_eq!(state.assistant.chat[2], ChatTurn::model(CHAT_FALLBACK));
    assert!(!state.assistant.chat_pending);
    assert!(!state.assistant.describing);
}

#[tokio::test]
async fn video_without_key_fails_for_that_car() {
    let store = store_with(
        Arc::new(MemoryStore::new()),
        Arc::new(GenerativeAssistant::offline()),
        RentalState::seeded(),
    );

    let outcome = store
        .send_and_wait_for(
            RentalAction::GenerateVideo {
                car_id: CarId::new("c2"),
                image: b"fake-jpeg".to_vec(),
                mime_type: "image/jpeg".to_string(),
                prompt: None,
            },
            |a| matches!(a, RentalAction::VideoFailed { .. } | RentalAction::VideoReady { .. }),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    let RentalAction::VideoFailed { car_id, reason } = outcome else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert_eq!(car_id, CarId::new("c2"));
    assert!(reason.contains("VIDEO_API_KEY"));
}

/// Assistant whose chat never answers
struct StalledAssistant;

impl Assistant for StalledAssistant {
    fn describe_car<'a>(&'a self, name: &'a str, _model_year: i32, _category: &'a str) -> BoxFuture<'a, String> {
        async move { name.to_string() }.boxed()
    }

    fn chat<'a>(&'a self, _message: &'a str, _history: &'a [ChatTurn]) -> BoxFuture<'a, String> {
        futures::future::pending().boxed()
    }

    fn video_script<'a>(&'a self, name: &'a str, _category: &'a str) -> BoxFuture<'a, String> {
        async move { name.to_string() }.boxed()
    }

    fn generate_video<'a>(&'a self, _request: &'a VideoRequest) -> BoxFuture<'a, Result<String, AssistantError>> {
        async { Err(AssistantError::EmptyResponse) }.boxed()
    }
}

#[tokio::test]
async fn cancelled_chat_never_replies() {
    let store = store_with(Arc::new(MemoryStore::new()), Arc::new(StalledAssistant), RentalState::seeded());
    let mut actions = store.subscribe_actions();

    let _pending = store
        .send(RentalAction::SendChatMessage {
            text: "Anyone there?".to_string(),
        })
        .await
        .unwrap();
    assert!(store.state(|s| s.assistant.chat_pending).await);

    store
        .send(RentalAction::CancelAssistantRequest {
            kind: AssistantRequest::Chat,
        })
        .await
        .unwrap();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert!(!store.state(|s| s.assistant.chat_pending).await);
    assert!(actions.try_recv().is_err());
}

#[tokio::test]
async fn chat_turns_each_get_a_reply() {
    let store = store_with(
        Arc::new(MemoryStore::new()),
        Arc::new(GenerativeAssistant::offline()),
        RentalState::seeded(),
    );

    for text in ["Hello", "Any SUVs?"] {
        let reply = store
            .send_and_wait_for(
                RentalAction::SendChatMessage { text: text.to_string() },
                |a| matches!(a, RentalAction::ChatReplyReceived { .. }),
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(reply, RentalAction::ChatReplyReceived {
            text: CHAT_FALLBACK.to_string(),
        });
        // the reply is broadcast before it is applied
        while store.state(|s| s.assistant.chat_pending).await {
            tokio::task::yield_now().await;
        }
    }

    let state = store.state(Clone::clone).await;
    assert!(state.last_error.is_none());
    assert_eq!(state.assistant.chat.len(), 5);
    assert_eq!(state.assistant.chat[3], ChatTurn::user("Any SUVs?"));
    assert_eq!(state.assistant.chat[4], ChatTurn::model(CHAT_FALLBACK));
}
