use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("rating {value} is outside 1..=5")]
    OutOfRange { value: i64 },
}
