use serde::{Deserialize, Serialize};

use crate::domain::{Dish, DishId, Rating};

/// Comment fields collected by the submission form. The store assigns the
/// identifier and creation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub dish_id: DishId,
    pub rating: Rating,
    pub author: String,
    pub comment: String,
}

/// Write commands issued by the interaction core. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StoreCommand {
    AddFavorite { dish_id: DishId },
    AddComment(NewComment),
}

impl StoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::AddFavorite { .. } => "add_favorite",
            StoreCommand::AddComment(_) => "add_comment",
        }
    }

    pub fn dish_id(&self) -> DishId {
        match self {
            StoreCommand::AddFavorite { dish_id } => *dish_id,
            StoreCommand::AddComment(new_comment) => new_comment.dish_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareContent {
    pub title: String,
    pub message: String,
    pub url: String,
    pub dialog_title: String,
}

impl ShareContent {
    pub fn for_dish(dish: &Dish, base_url: &str) -> Self {
        let url = format!("{base_url}{}", dish.image);
        Self {
            title: dish.name.clone(),
            message: format!("{}: {} {url}", dish.name, dish.description),
            url,
            dialog_title: format!("Share {}", dish.name),
        }
    }
}
