//! Interaction core for the dish detail view.

pub mod comment_form;
pub mod dish_detail;
pub mod error;
pub mod favorite;
pub mod gesture;
pub mod store;

pub use comment_form::{CommentDraft, CommentFormState, FormVisibility};
pub use dish_detail::{DetailHost, DishDetailController, GestureOutcome};
pub use error::InteractionError;
pub use favorite::{
    Confirmation, ConfirmationPrompt, ConfirmationRequest, FavoriteController, FavoriteOutcome,
};
pub use gesture::{Classification, GestureClassifier, GestureSample, GestureSession};
pub use store::{QueuedStore, Store, StoreEvent};
