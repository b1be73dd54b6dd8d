use shared::{
    domain::{DishId, Rating},
    protocol::NewComment,
};

use crate::error::InteractionError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentDraft {
    pub author: String,
    pub comment: String,
    pub rating: Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormVisibility {
    #[default]
    Closed,
    Open,
}

/// Closing by submit or cancel resets the draft to its defaults.
#[derive(Debug, Default)]
pub struct CommentFormState {
    visibility: FormVisibility,
    draft: CommentDraft,
}

impl CommentFormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(&self) -> FormVisibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility == FormVisibility::Open
    }

    pub fn draft(&self) -> &CommentDraft {
        &self.draft
    }

    /// Returns `false` if the form was already open; the draft is kept then.
    pub fn open(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        self.draft = CommentDraft::default();
        self.visibility = FormVisibility::Open;
        true
    }

    pub fn set_rating(&mut self, value: u8) -> Result<(), InteractionError> {
        self.require_open("set rating")?;
        self.draft.rating = Rating::new(value)?;
        Ok(())
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> Result<(), InteractionError> {
        self.require_open("set author")?;
        self.draft.author = author.into();
        Ok(())
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> Result<(), InteractionError> {
        self.require_open("set comment")?;
        self.draft.comment = comment.into();
        Ok(())
    }

    /// Packages the draft for `dish_id` and closes the form.
    pub fn submit(&mut self, dish_id: DishId) -> Result<NewComment, InteractionError> {
        self.require_open("submit")?;
        let draft = self.close();
        Ok(NewComment {
            dish_id,
            rating: draft.rating,
            author: draft.author,
            comment: draft.comment,
        })
    }

    /// Discards the draft. Returns `false` if the form was not open.
    pub fn cancel(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.close();
        true
    }

    fn close(&mut self) -> CommentDraft {
        self.visibility = FormVisibility::Closed;
        std::mem::take(&mut self.draft)
    }

    fn require_open(&self, action: &'static str) -> Result<(), InteractionError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(InteractionError::FormClosed { action })
        }
    }
}
