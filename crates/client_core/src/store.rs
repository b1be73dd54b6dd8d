use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::{
    domain::{Comment, Dish, DishId, FavoriteSet},
    protocol::{NewComment, StoreCommand},
};
use storage::StoreBackend;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

/// Reads are awaited. Writes are fire-and-forget and never retried.
#[async_trait]
pub trait Store: Send + Sync {
    async fn dishes(&self) -> Result<Vec<Dish>>;
    async fn comments(&self) -> Result<Vec<Comment>>;
    async fn comments_for_dish(&self, dish_id: DishId) -> Result<Vec<Comment>>;
    async fn favorites(&self) -> Result<FavoriteSet>;
    fn add_favorite(&self, dish_id: DishId);
    fn add_comment(&self, new_comment: NewComment);
}

/// Outcomes published by the queued store after the backend applied a command.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    FavoriteAdded(DishId),
    FavoriteAlreadyPresent(DishId),
    CommentAdded(Comment),
    CommandFailed { command: StoreCommand, error: String },
}

enum QueuedCommand {
    Apply(StoreCommand),
    Flush(oneshot::Sender<()>),
}

/// [`Store`] over a [`StoreBackend`], with writes applied in order by a
/// single worker task.
pub struct QueuedStore {
    backend: Arc<dyn StoreBackend>,
    commands: mpsc::UnboundedSender<QueuedCommand>,
    events: broadcast::Sender<StoreEvent>,
    worker: JoinHandle<()>,
}

impl QueuedStore {
    /// Must be called from within a tokio runtime.
    pub fn spawn(backend: Arc<dyn StoreBackend>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(256);
        let worker = tokio::spawn(run_worker(Arc::clone(&backend), rx, events.clone()));
        Self {
            backend,
            commands,
            events,
            worker,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Waits until every command queued before this call has been applied.
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(QueuedCommand::Flush(tx))
            .ok()
            .context("store worker is not running")?;
        rx.await.context("store worker stopped before flushing")?;
        Ok(())
    }

    /// Closes the queue and waits for the worker to apply what is left in it.
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            commands, worker, ..
        } = self;
        drop(commands);
        worker.await.context("store worker panicked")?;
        Ok(())
    }

    fn dispatch(&self, command: StoreCommand) {
        let name = command.name();
        let dish_id = command.dish_id().0;
        match self.commands.send(QueuedCommand::Apply(command)) {
            Ok(()) => debug!(command = name, dish_id, "queued store command"),
            Err(_) => error!(
                command = name,
                dish_id, "store worker is not running; command dropped"
            ),
        }
    }
}

#[async_trait]
impl Store for QueuedStore {
    async fn dishes(&self) -> Result<Vec<Dish>> {
        self.backend.list_dishes().await.context("failed to read dishes")
    }

    async fn comments(&self) -> Result<Vec<Comment>> {
        self.backend
            .list_comments()
            .await
            .context("failed to read comments")
    }

    async fn comments_for_dish(&self, dish_id: DishId) -> Result<Vec<Comment>> {
        self.backend
            .list_comments_for_dish(dish_id)
            .await
            .with_context(|| format!("failed to read comments for dish {}", dish_id.0))
    }

    async fn favorites(&self) -> Result<FavoriteSet> {
        self.backend
            .list_favorites()
            .await
            .context("failed to read favorites")
    }

    fn add_favorite(&self, dish_id: DishId) {
        self.dispatch(StoreCommand::AddFavorite { dish_id });
    }

    fn add_comment(&self, new_comment: NewComment) {
        self.dispatch(StoreCommand::AddComment(new_comment));
    }
}

async fn run_worker(
    backend: Arc<dyn StoreBackend>,
    mut rx: mpsc::UnboundedReceiver<QueuedCommand>,
    events: broadcast::Sender<StoreEvent>,
) {
    while let Some(queued) = rx.recv().await {
        match queued {
            QueuedCommand::Apply(command) => {
                let event = apply_command(backend.as_ref(), command).await;
                // No subscribers is fine.
                let _ = events.send(event);
            }
            QueuedCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("store worker stopped");
}

async fn apply_command(backend: &dyn StoreBackend, command: StoreCommand) -> StoreEvent {
    let result = match &command {
        StoreCommand::AddFavorite { dish_id } => {
            backend
                .insert_favorite(*dish_id)
                .await
                .map(|added| {
                    if added {
                        info!(dish_id = dish_id.0, "favorite added");
                        StoreEvent::FavoriteAdded(*dish_id)
                    } else {
                        warn!(dish_id = dish_id.0, "favorite already stored");
                        StoreEvent::FavoriteAlreadyPresent(*dish_id)
                    }
                })
        }
        StoreCommand::AddComment(new_comment) => {
            backend.insert_comment(new_comment).await.map(|comment| {
                info!(
                    dish_id = comment.dish_id.0,
                    comment_id = comment.id.0,
                    rating = comment.rating.get(),
                    "comment added"
                );
                StoreEvent::CommentAdded(comment)
            })
        }
    };

    result.unwrap_or_else(|err| {
        error!(
            command = command.name(),
            dish_id = command.dish_id().0,
            error = %format!("{err:#}"),
            "store command failed"
        );
        StoreEvent::CommandFailed {
            command,
            error: format!("{err:#}"),
        }
    })
}
