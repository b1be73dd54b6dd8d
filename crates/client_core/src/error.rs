use shared::error::RatingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("a gesture session is already active")]
    SessionAlreadyActive,
    #[error("no gesture session is active")]
    NoActiveSession,
    #[error("comment form is closed; cannot {action}")]
    FormClosed { action: &'static str },
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error("dish {dish_id} is not in the catalog")]
    UnknownDish { dish_id: i64 },
}
