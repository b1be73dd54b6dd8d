use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use shared::domain::{Dish, DishId};
use tracing::info;

use crate::store::Store;

/// The user's answer to a yes/no prompt. `Dismissed` means the prompt was
/// closed without choosing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Affirmed,
    Declined,
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub title: String,
    pub message: String,
}

impl ConfirmationRequest {
    pub fn add_favorite(dish_name: &str) -> Self {
        Self {
            title: "Add Favorite".to_string(),
            message: format!("Are you sure you wish to add {dish_name} to favorite?"),
        }
    }
}

/// Host-provided prompt. May stay pending for as long as the user takes.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, request: &ConfirmationRequest) -> Confirmation;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Marked,
    AlreadyFavorite,
    Declined,
    Dismissed,
}

impl FavoriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Marked => "marked",
            Self::AlreadyFavorite => "already_favorite",
            Self::Declined => "declined",
            Self::Dismissed => "dismissed",
        }
    }
}

pub struct FavoriteController {
    store: Arc<dyn Store>,
    prompt: Arc<dyn ConfirmationPrompt>,
    // Marks issued from here; the store may not reflect them yet.
    issued: HashSet<DishId>,
}

impl FavoriteController {
    pub fn new(store: Arc<dyn Store>, prompt: Arc<dyn ConfirmationPrompt>) -> Self {
        Self {
            store,
            prompt,
            issued: HashSet::new(),
        }
    }

    pub fn has_issued(&self, dish_id: DishId) -> bool {
        self.issued.contains(&dish_id)
    }

    pub async fn attempt_mark_favorite(
        &mut self,
        dish: &Dish,
        currently_favorite: bool,
    ) -> FavoriteOutcome {
        if currently_favorite || self.issued.contains(&dish.id) {
            info!(dish_id = dish.id.0, "already favorite");
            return FavoriteOutcome::AlreadyFavorite;
        }

        let request = ConfirmationRequest::add_favorite(&dish.name);
        match self.prompt.confirm(&request).await {
            Confirmation::Affirmed => {
                self.issued.insert(dish.id);
                self.store.add_favorite(dish.id);
                info!(dish_id = dish.id.0, "favorite requested");
                FavoriteOutcome::Marked
            }
            Confirmation::Declined => {
                info!(dish_id = dish.id.0, "favorite declined");
                FavoriteOutcome::Declined
            }
            Confirmation::Dismissed => {
                info!(dish_id = dish.id.0, "favorite prompt dismissed");
                FavoriteOutcome::Dismissed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use anyhow::Result;
    use shared::{
        domain::{Comment, FavoriteSet},
        protocol::NewComment,
    };

    #[derive(Default)]
    struct CountingStore {
        favorites: Mutex<Vec<DishId>>,
    }

    #[async_trait]
    impl Store for CountingStore {
        async fn dishes(&self) -> Result<Vec<Dish>> {
            Ok(Vec::new())
        }

        async fn comments(&self) -> Result<Vec<Comment>> {
            Ok(Vec::new())
        }

        async fn comments_for_dish(&self, _dish_id: DishId) -> Result<Vec<Comment>> {
            Ok(Vec::new())
        }

        async fn favorites(&self) -> Result<FavoriteSet> {
            Ok(self.favorites.lock().expect("lock").iter().copied().collect())
        }

        fn add_favorite(&self, dish_id: DishId) {
            self.favorites.lock().expect("lock").push(dish_id);
        }

        fn add_comment(&self, _new_comment: NewComment) {}
    }

    struct Always(Confirmation);

    #[async_trait]
    impl ConfirmationPrompt for Always {
        async fn confirm(&self, _request: &ConfirmationRequest) -> Confirmation {
            self.0
        }
    }

    fn dish(id: i64) -> Dish {
        Dish {
            id: DishId(id),
            name: "Vadonut".into(),
            description: "A quintessential ConFusion experience".into(),
            image: "images/vadonut.png".into(),
            category: None,
            label: None,
            price: None,
            featured: false,
        }
    }

    #[tokio::test]
    async fn currently_favorite_never_writes() {
        let store = Arc::new(CountingStore::default());
        let mut controller =
            FavoriteController::new(store.clone(), Arc::new(Always(Confirmation::Affirmed)));
        for _ in 0..5 {
            assert_eq!(
                controller.attempt_mark_favorite(&dish(3), true).await,
                FavoriteOutcome::AlreadyFavorite
            );
        }
        assert!(store.favorites.lock().expect("lock").is_empty());
        assert!(!controller.has_issued(DishId(3)));
    }

    #[tokio::test]
    async fn affirmed_mark_is_remembered() {
        let store = Arc::new(CountingStore::default());
        let mut controller =
            FavoriteController::new(store.clone(), Arc::new(Always(Confirmation::Affirmed)));
        assert_eq!(
            controller.attempt_mark_favorite(&dish(3), false).await,
            FavoriteOutcome::Marked
        );
        assert_eq!(
            controller.attempt_mark_favorite(&dish(3), false).await,
            FavoriteOutcome::AlreadyFavorite
        );
        assert_eq!(*store.favorites.lock().expect("lock"), vec![DishId(3)]);
    }

    #[tokio::test]
    async fn dismissed_prompt_is_not_an_error() {
        let store = Arc::new(CountingStore::default());
        let mut controller =
            FavoriteController::new(store.clone(), Arc::new(Always(Confirmation::Dismissed)));
        assert_eq!(
            controller.attempt_mark_favorite(&dish(4), false).await,
            FavoriteOutcome::Dismissed
        );
        assert!(store.favorites.lock().expect("lock").is_empty());
        assert!(!controller.has_issued(DishId(4)));
    }

    #[test]
    fn request_names_the_dish() {
        let request = ConfirmationRequest::add_favorite("Vadonut");
        assert_eq!(request.title, "Add Favorite");
        assert_eq!(
            request.message,
            "Are you sure you wish to add Vadonut to favorite?"
        );
    }
}
