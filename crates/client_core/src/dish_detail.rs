use std::sync::Arc;

use anyhow::Result;
use shared::{
    domain::{Comment, Dish, DishId},
    protocol::{NewComment, ShareContent},
};
use tracing::{debug, info};

use crate::{
    comment_form::CommentFormState,
    error::InteractionError,
    favorite::{ConfirmationPrompt, FavoriteController, FavoriteOutcome},
    gesture::{Classification, GestureClassifier, GestureSample},
    store::Store,
};

/// Side-effecting primitives supplied by the host UI.
pub trait DetailHost: Send + Sync {
    /// Called when a touch session is granted. Must not block.
    fn acknowledge_grant(&self) {}

    fn share(&self, content: &ShareContent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Favorite(FavoriteOutcome),
    CommentFormOpened,
    NoAction,
}

pub struct DishDetailController {
    dish: Dish,
    base_url: String,
    store: Arc<dyn Store>,
    host: Arc<dyn DetailHost>,
    classifier: GestureClassifier,
    favorites: FavoriteController,
    form: CommentFormState,
}

impl DishDetailController {
    pub fn new(
        dish: Dish,
        store: Arc<dyn Store>,
        prompt: Arc<dyn ConfirmationPrompt>,
        host: Arc<dyn DetailHost>,
    ) -> Self {
        Self {
            dish,
            base_url: String::new(),
            favorites: FavoriteController::new(Arc::clone(&store), prompt),
            store,
            host,
            classifier: GestureClassifier::new(),
            form: CommentFormState::new(),
        }
    }

    /// Looks the dish up in the store's catalog.
    pub async fn load(
        dish_id: DishId,
        store: Arc<dyn Store>,
        prompt: Arc<dyn ConfirmationPrompt>,
        host: Arc<dyn DetailHost>,
    ) -> Result<Self> {
        let dish = store
            .dishes()
            .await?
            .into_iter()
            .find(|dish| dish.id == dish_id)
            .ok_or(InteractionError::UnknownDish { dish_id: dish_id.0 })?;
        Ok(Self::new(dish, store, prompt, host))
    }

    /// Prefix joined with the dish image path when sharing.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn dish(&self) -> &Dish {
        &self.dish
    }

    pub fn form(&self) -> &CommentFormState {
        &self.form
    }

    pub fn gesture_active(&self) -> bool {
        self.classifier.is_active()
    }

    pub async fn is_favorite(&self) -> Result<bool> {
        if self.favorites.has_issued(self.dish.id) {
            return Ok(true);
        }
        Ok(self.store.favorites().await?.contains(self.dish.id))
    }

    pub async fn comments(&self) -> Result<Vec<Comment>> {
        self.store.comments_for_dish(self.dish.id).await
    }

    pub fn begin_gesture(&mut self) -> Result<(), InteractionError> {
        self.classifier.begin()?;
        self.host.acknowledge_grant();
        Ok(())
    }

    pub fn record_sample(&mut self, sample: GestureSample) -> Result<(), InteractionError> {
        self.classifier.record(sample)
    }

    pub async fn end_gesture(&mut self) -> Result<GestureOutcome> {
        let classification = self.classifier.end()?;
        info!(
            dish_id = self.dish.id.0,
            classification = classification.as_str(),
            "gesture classified"
        );
        match classification {
            Classification::Favorite => Ok(GestureOutcome::Favorite(self.press_favorite().await?)),
            Classification::Comment => {
                if self.press_comment() {
                    Ok(GestureOutcome::CommentFormOpened)
                } else {
                    Ok(GestureOutcome::NoAction)
                }
            }
            Classification::None => Ok(GestureOutcome::NoAction),
        }
    }

    pub async fn press_favorite(&mut self) -> Result<FavoriteOutcome> {
        let currently_favorite = self.store.favorites().await?.contains(self.dish.id);
        Ok(self
            .favorites
            .attempt_mark_favorite(&self.dish, currently_favorite)
            .await)
    }

    /// Returns `false` if the form was already open.
    pub fn press_comment(&mut self) -> bool {
        let opened = self.form.open();
        debug!(dish_id = self.dish.id.0, opened, "comment form opened");
        opened
    }

    pub fn set_rating(&mut self, rating: u8) -> Result<(), InteractionError> {
        self.form.set_rating(rating)
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> Result<(), InteractionError> {
        self.form.set_author(author)
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> Result<(), InteractionError> {
        self.form.set_comment(comment)
    }

    pub fn submit_comment(&mut self) -> Result<NewComment, InteractionError> {
        let new_comment = self.form.submit(self.dish.id)?;
        info!(
            dish_id = new_comment.dish_id.0,
            rating = new_comment.rating.get(),
            "comment submitted"
        );
        self.store.add_comment(new_comment.clone());
        Ok(new_comment)
    }

    pub fn cancel_comment(&mut self) -> bool {
        let cancelled = self.form.cancel();
        debug!(dish_id = self.dish.id.0, cancelled, "comment form cancelled");
        cancelled
    }

    pub fn share(&self) -> ShareContent {
        let content = ShareContent::for_dish(&self.dish, &self.base_url);
        self.host.share(&content);
        content
    }
}

#[cfg(test)]
#[path = "tests/dish_detail_tests.rs"]
mod tests;
