use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RatingError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(DishId);
id_newtype!(CommentId);

/// Star rating attached to a comment. Always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: Rating = Rating(3);

    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange {
                value: value.into(),
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| RatingError::OutOfRange { value })
            .and_then(Self::new)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub dish_id: DishId,
    pub author: String,
    pub rating: Rating,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// Dish identifiers the user has marked. Grows only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<DishId>);

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, dish_id: DishId) -> bool {
        self.0.contains(&dish_id)
    }

    /// Returns `false` when the dish was already present.
    pub fn insert(&mut self, dish_id: DishId) -> bool {
        self.0.insert(dish_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DishId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<DishId> for FavoriteSet {
    fn from_iter<T: IntoIterator<Item = DishId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_rejects_values_outside_one_to_five() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(5).expect("rating").get(), 5);
        assert_eq!(Rating::default().get(), 3);
    }

    #[test]
    fn stored_rating_error_keeps_the_raw_value() {
        for raw in [256_i64, -3, 0, 6] {
            assert_eq!(
                Rating::try_from(raw),
                Err(RatingError::OutOfRange { value: raw })
            );
        }
        assert_eq!(
            Rating::try_from(256_i64)
                .expect_err("out of range")
                .to_string(),
            "rating 256 is outside 1..=5"
        );
        assert_eq!(Rating::try_from(2_i64).expect("rating").get(), 2);
    }

    #[test]
    fn rating_rejects_out_of_range_json() {
        let err = serde_json::from_str::<Rating>("9").expect_err("out of range");
        assert!(err.to_string().contains("rating 9"));
        let ok: Rating = serde_json::from_str("4").expect("in range");
        assert_eq!(ok.get(), 4);
    }

    #[test]
    fn favorite_set_ignores_duplicates() {
        let mut favorites = FavoriteSet::new();
        assert!(favorites.insert(DishId(3)));
        assert!(!favorites.insert(DishId(3)));
        assert_eq!(favorites.len(), 1);
        assert!(favorites.contains(DishId(3)));
        assert!(!favorites.contains(DishId(2)));
    }

    #[test]
    fn dish_defaults_optional_catalog_fields() {
        let dish: Dish = serde_json::from_str(
            r#"{"id":0,"name":"Uthappizza","description":"A unique combination","image":"images/uthappizza.png"}"#,
        )
        .expect("dish");
        assert_eq!(dish.id, DishId(0));
        assert!(dish.category.is_none());
        assert!(!dish.featured);
    }
}
