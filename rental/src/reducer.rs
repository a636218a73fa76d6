//! Reducer for the marketplace.
//!
//! Commands are validated and applied synchronously against [`RentalState`].
//! A rejected command becomes a [`RentalAction::CommandRejected`] event that
//! records the error; an accepted one clears it and returns a storage write
//! effect. Assistant commands start cancellable effects whose results come
//! back as events.

use std::sync::Arc;

use driveeasy_assistant::{Assistant, ChatTurn, VideoRequest};
use driveeasy_core::effect::{Effect, EffectId};
use driveeasy_core::environment::{Clock, IdGenerator};
use driveeasy_core::reducer::Reducer;
use driveeasy_core::{SmallVec, smallvec};
use futures::future::BoxFuture;

use crate::booking::BookingRequest;
use crate::error::RentalError;
use crate::persistence::{self, KeyValueStore, StorageKey, StorageWrite, StorageWriter};
use crate::state::{RentalState, VideoStatus};
use crate::types::{BookingId, CarDraft, CarId, Category, ReviewDraft, ReviewId, UserRole};

/// Assistant request kinds; each runs under its own [`EffectId`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssistantRequest {
    /// Listing description
    Description,
    /// DriveBot reply
    Chat,
    /// Promo video script
    VideoScript,
    /// Promo video
    Video,
}

impl AssistantRequest {
    /// Effect id of requests of this kind
    #[must_use]
    pub fn effect_id(self) -> EffectId {
        EffectId::new(match self {
            Self::Description => "assistant.description",
            Self::Chat => "assistant.chat",
            Self::VideoScript => "assistant.video-script",
            Self::Video => "assistant.video",
        })
    }
}

/// Commands and events of the marketplace
#[derive(Clone, Debug, PartialEq)]
pub enum RentalAction {
    // ========== Commands ==========
    /// Sign in
    Login {
        /// Email entered
        email: String,
        /// Role chosen
        role: UserRole,
    },
    /// Sign out
    Logout,
    /// List a car as the signed-in user
    AddCar {
        /// Listing attributes
        draft: CarDraft,
    },
    /// Edit a listing
    UpdateCar {
        /// Listing to edit
        car_id: CarId,
        /// New attributes
        draft: CarDraft,
    },
    /// Remove a listing and everything referencing it
    DeleteCar {
        /// Listing to remove
        car_id: CarId,
    },
    /// Add or remove a favorite
    ToggleFavorite {
        /// Car to toggle
        car_id: CarId,
    },
    /// Book a car as the signed-in user
    CreateBooking {
        /// Booking form
        request: BookingRequest,
    },
    /// Owner accepts a booking
    ApproveBooking {
        /// Booking to approve
        booking_id: BookingId,
    },
    /// Owner declines a booking
    RejectBooking {
        /// Booking to reject
        booking_id: BookingId,
    },
    /// Client reviews an approved booking
    AddReview {
        /// Review form
        review: ReviewDraft,
    },
    /// Restore demo data and clear storage
    ResetData,
    /// Ask for listing copy
    GenerateDescription {
        /// Car name
        name: String,
        /// Model year
        model_year: i32,
        /// Category
        category: Category,
    },
    /// Send a chat message to DriveBot
    SendChatMessage {
        /// Message text
        text: String,
    },
    /// Ask for a promo video script for a car
    PrepareVideoScript {
        /// Car to promote
        car_id: CarId,
    },
    /// Generate a promo video from a car photo
    GenerateVideo {
        /// Car to promote
        car_id: CarId,
        /// Photo bytes
        image: Vec<u8>,
        /// Photo MIME type
        mime_type: String,
        /// Prompt; defaults to the car's video script
        prompt: Option<String>,
    },
    /// Abandon an in-flight assistant request
    CancelAssistantRequest {
        /// Request kind
        kind: AssistantRequest,
    },

    // ========== Events ==========
    /// A command failed validation
    CommandRejected {
        /// Why
        error: RentalError,
    },
    /// Listing copy arrived
    DescriptionGenerated {
        /// Generated text
        text: String,
    },
    /// DriveBot answered
    ChatReplyReceived {
        /// Reply text
        text: String,
    },
    /// Video script arrived
    VideoScriptReady {
        /// Car promoted
        car_id: CarId,
        /// Script text
        script: String,
    },
    /// Promo video finished
    VideoReady {
        /// Car promoted
        car_id: CarId,
        /// Video URI
        uri: String,
    },
    /// Promo video failed
    VideoFailed {
        /// Car promoted
        car_id: CarId,
        /// Failure description
        reason: String,
    },
}

/// Dependencies of the marketplace reducer
#[derive(Clone)]
pub struct RentalEnvironment {
    /// Time source; `today()` drives the past-date rule
    pub clock: Arc<dyn Clock>,
    /// Identifier source for new records
    pub ids: Arc<dyn IdGenerator>,
    /// Ordered writer over the store the collections are persisted to
    pub storage: Arc<StorageWriter>,
    /// Generative collaborator
    pub assistant: Arc<dyn Assistant>,
}

impl RentalEnvironment {
    /// Creates a `RentalEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        storage: Arc<dyn KeyValueStore>,
        assistant: Arc<dyn Assistant>,
    ) -> Self {
        Self {
            clock,
            ids,
            storage: Arc::new(StorageWriter::new(storage)),
            assistant,
        }
    }
}

type Effects = SmallVec<[Effect<RentalAction>; 4]>;

/// Reducer for the marketplace
#[derive(Clone, Debug, Default)]
pub struct RentalReducer;

impl RentalReducer {
    /// Creates a new `RentalReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Records a rejection
    fn reject(state: &mut RentalState, error: RentalError) -> Effects {
        tracing::debug!(%error, "Command rejected");
        Self::apply_event(state, RentalAction::CommandRejected { error });
        SmallVec::new()
    }

    /// Clears the last error and writes the touched collections
    fn accept(state: &mut RentalState, keys: &[StorageKey], env: &RentalEnvironment) -> Effects {
        state.last_error = None;
        smallvec![Self::persist(persistence::snapshot(state, keys), env)]
    }

    /// Queues `writes` behind every earlier batch
    fn persist(writes: Vec<StorageWrite>, env: &RentalEnvironment) -> Effect<RentalAction> {
        let write = env.storage.enqueue(writes);
        Effect::future(async move {
            write.await;
            None
        })
    }

    /// Accepts or rejects depending on `result`
    fn settle<T>(
        state: &mut RentalState,
        result: Result<T, RentalError>,
        keys: &[StorageKey],
        env: &RentalEnvironment,
    ) -> Effects {
        match result {
            Ok(_) => Self::accept(state, keys, env),
            Err(error) => Self::reject(state, error),
        }
    }

    /// Accepts an assistant command and runs `task` under its effect id
    fn assistant_task<F>(state: &mut RentalState, kind: AssistantRequest, env: &RentalEnvironment, task: F) -> Effects
    where
        F: FnOnce(Arc<dyn Assistant>) -> BoxFuture<'static, RentalAction>,
    {
        state.last_error = None;
        let fut = task(Arc::clone(&env.assistant));
        smallvec![Effect::future(async move { Some(fut.await) }).cancellable(kind.effect_id())]
    }

    /// Applies an event to state
    fn apply_event(state: &mut RentalState, event: RentalAction) {
        match event {
            RentalAction::CommandRejected { error } => {
                state.last_error = Some(error);
            },
            RentalAction::DescriptionGenerated { text } => {
                state.assistant.draft_description = Some(text);
                state.assistant.describing = false;
            },
            RentalAction::ChatReplyReceived { text } => {
                state.assistant.chat.push(ChatTurn::model(text));
                state.assistant.chat_pending = false;
            },
            RentalAction::VideoScriptReady { car_id, script } => {
                state.assistant.video_scripts.insert(car_id, script);
            },
            RentalAction::VideoReady { car_id, uri } => {
                tracing::info!(%car_id, "Promo video ready");
                state.assistant.videos.insert(car_id, VideoStatus::Ready(uri));
            },
            RentalAction::VideoFailed { car_id, reason } => {
                tracing::warn!(%car_id, %reason, "Promo video failed");
                state.assistant.videos.insert(car_id, VideoStatus::Failed(reason));
            },
            // Commands are not applied to state
            _ => {},
        }
    }

    fn reduce_assistant(state: &mut RentalState, action: RentalAction, env: &RentalEnvironment) -> Effects {
        match action {
            RentalAction::GenerateDescription {
                name,
                model_year,
                category,
            } => {
                if name.trim().is_empty() {
                    return Self::reject(state, RentalError::EmptyField { field: "name" });
                }
                state.assistant.describing = true;
                Self::assistant_task(state, AssistantRequest::Description, env, move |assistant| {
                    Box::pin(async move {
                        let text = assistant.describe_car(&name, model_year, category.as_str()).await;
                        RentalAction::DescriptionGenerated { text }
                    })
                })
            },

            RentalAction::SendChatMessage { text } => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Self::reject(state, RentalError::EmptyField { field: "message" });
                }
                if state.assistant.chat_pending {
                    return Self::reject(state, RentalError::ReplyPending);
                }
                let history = state.assistant.chat.clone();
                state.assistant.chat.push(ChatTurn::user(text.clone()));
                state.assistant.chat_pending = true;
                Self::assistant_task(state, AssistantRequest::Chat, env, move |assistant| {
                    Box::pin(async move {
                        let text = assistant.chat(&text, &history).await;
                        RentalAction::ChatReplyReceived { text }
                    })
                })
            },

            RentalAction::PrepareVideoScript { car_id } => {
                let Some(car) = state.car(&car_id) else {
                    return Self::reject(state, RentalError::CarNotFound(car_id));
                };
                let (name, category) = (car.name.clone(), car.category);
                Self::assistant_task(state, AssistantRequest::VideoScript, env, move |assistant| {
                    Box::pin(async move {
                        let script = assistant.video_script(&name, category.as_str()).await;
                        RentalAction::VideoScriptReady { car_id, script }
                    })
                })
            },

            RentalAction::GenerateVideo {
                car_id,
                image,
                mime_type,
                prompt,
            } => {
                if state.car(&car_id).is_none() {
                    return Self::reject(state, RentalError::CarNotFound(car_id));
                }
                if image.is_empty() {
                    return Self::reject(state, RentalError::EmptyField { field: "image" });
                }
                let request = VideoRequest {
                    image,
                    mime_type,
                    prompt: prompt.or_else(|| state.assistant.video_scripts.get(&car_id).cloned()),
                };
                state.assistant.videos.insert(car_id.clone(), VideoStatus::Generating);
                Self::assistant_task(state, AssistantRequest::Video, env, move |assistant| {
                    Box::pin(async move {
                        match assistant.generate_video(&request).await {
                            Ok(uri) => RentalAction::VideoReady { car_id, uri },
                            Err(error) => RentalAction::VideoFailed {
                                car_id,
                                reason: error.to_string(),
                            },
                        }
                    })
                })
            },

            RentalAction::CancelAssistantRequest { kind } => {
                match kind {
                    AssistantRequest::Description => state.assistant.describing = false,
                    AssistantRequest::Chat => state.assistant.chat_pending = false,
                    AssistantRequest::VideoScript => {},
                    AssistantRequest::Video => state
                        .assistant
                        .videos
                        .retain(|_, status| *status != VideoStatus::Generating),
                }
                smallvec![Effect::Cancel(kind.effect_id())]
            },

            _ => SmallVec::new(),
        }
    }
}

impl Reducer for RentalReducer {
    type State = RentalState;
    type Action = RentalAction;
    type Environment = RentalEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            RentalAction::Login { email, role } => {
                let result = state.login(&email, role).map(|user| tracing::info!(user_id = %user.id, "Signed in"));
                Self::settle(state, result, &[StorageKey::User], env)
            },

            RentalAction::Logout => {
                state.logout();
                Self::accept(state, &[StorageKey::User], env)
            },

            RentalAction::AddCar { draft } => {
                let id = CarId::new(env.ids.next_id());
                let result = state.add_car(draft, id).map(|car| tracing::info!(car_id = %car.id, "Car listed"));
                Self::settle(state, result, &[StorageKey::Cars], env)
            },

            RentalAction::UpdateCar { car_id, draft } => {
                let result = state.update_car(&car_id, draft).map(|_| ());
                Self::settle(state, result, &[StorageKey::Cars], env)
            },

            RentalAction::DeleteCar { car_id } => {
                let result = state.delete_car(&car_id);
                Self::settle(
                    state,
                    result,
                    &[StorageKey::Cars, StorageKey::Bookings, StorageKey::Reviews, StorageKey::Favorites],
                    env,
                )
            },

            RentalAction::ToggleFavorite { car_id } => {
                let result = state.toggle_favorite(&car_id);
                Self::settle(state, result, &[StorageKey::Favorites], env)
            },

            RentalAction::CreateBooking { request } => {
                let id = BookingId::new(env.ids.next_id());
                let result = state
                    .create_booking(&request, env.clock.today(), id, env.clock.now())
                    .map(|b| tracing::info!(booking_id = %b.id, car_id = %b.car_id, total = b.total_price, "Booking requested"));
                Self::settle(state, result, &[StorageKey::Bookings], env)
            },

            RentalAction::ApproveBooking { booking_id } => {
                let result = state.approve_booking(&booking_id);
                Self::settle(state, result, &[StorageKey::Bookings], env)
            },

            RentalAction::RejectBooking { booking_id } => {
                let result = state.reject_booking(&booking_id);
                Self::settle(state, result, &[StorageKey::Bookings], env)
            },

            RentalAction::AddReview { review } => {
                let id = ReviewId::new(env.ids.next_id());
                let result = state.add_review(review, id, env.clock.now()).map(|_| ());
                Self::settle(state, result, &[StorageKey::Reviews, StorageKey::Cars], env)
            },

            RentalAction::ResetData => {
                state.reset();
                state.last_error = None;
                tracing::info!("Demo data restored");
                let mut writes = vec![StorageWrite::Clear];
                writes.extend(persistence::snapshot(
                    state,
                    &[StorageKey::Cars, StorageKey::Bookings, StorageKey::Reviews, StorageKey::Favorites],
                ));
                smallvec![Self::persist(writes, env)]
            },

            action @ (RentalAction::GenerateDescription { .. }
            | RentalAction::SendChatMessage { .. }
            | RentalAction::PrepareVideoScript { .. }
            | RentalAction::GenerateVideo { .. }
            | RentalAction::CancelAssistantRequest { .. }) => Self::reduce_assistant(state, action, env),

            // ========== Events ==========
            event @ (RentalAction::CommandRejected { .. }
            | RentalAction::DescriptionGenerated { .. }
            | RentalAction::ChatReplyReceived { .. }
            | RentalAction::VideoScriptReady { .. }
            | RentalAction::VideoReady { .. }
            | RentalAction::VideoFailed { .. }) => {
                Self::apply_event(state, event);
                SmallVec::new()
            },
        }
    }
}
