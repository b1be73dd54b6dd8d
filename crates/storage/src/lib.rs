use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{
    domain::{Comment, CommentId, Dish, DishId, FavoriteSet, Rating},
    protocol::NewComment,
};

/// Backing system of record for dishes, comments and favorites.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn list_dishes(&self) -> Result<Vec<Dish>>;
    async fn list_comments(&self) -> Result<Vec<Comment>>;
    async fn list_comments_for_dish(&self, dish_id: DishId) -> Result<Vec<Comment>>;
    async fn list_favorites(&self) -> Result<FavoriteSet>;
    /// Returns `false` when the dish was already a favorite.
    async fn insert_favorite(&self, dish_id: DishId) -> Result<bool>;
    async fn insert_comment(&self, new_comment: &NewComment) -> Result<Comment>;
    /// Replaces catalog rows with `dishes`. Comments and favorites are kept.
    async fn seed_dishes(&self, dishes: &[Dish]) -> Result<()>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool_options = if is_memory_url(database_url) {
            // Every connection to an in-memory URL opens its own database, so
            // keep exactly one alive for the lifetime of the pool.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts catalog comments keeping their identifiers and dates.
    pub async fn seed_comments(&self, comments: &[Comment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for comment in comments {
            sqlx::query(
                "INSERT OR IGNORE INTO comments (id, dish_id, rating, author, comment, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(comment.id.0)
            .bind(comment.dish_id.0)
            .bind(i64::from(comment.rating.get()))
            .bind(&comment.author)
            .bind(&comment.comment)
            .bind(comment.date)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to seed comment {}", comment.id.0))?;
        }
        tx.commit().await?;
        tracing::debug!(count = comments.len(), "seeded comments");
        Ok(())
    }
}

#[async_trait]
impl StoreBackend for Storage {
    async fn list_dishes(&self) -> Result<Vec<Dish>> {
        let rows = sqlx::query(
            "SELECT id, name, description, image, category, label, price, featured
             FROM dishes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(dish_from_row).collect())
    }

    async fn list_comments(&self) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, dish_id, rating, author, comment, created_at FROM comments ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn list_comments_for_dish(&self, dish_id: DishId) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, dish_id, rating, author, comment, created_at
             FROM comments WHERE dish_id = ? ORDER BY id",
        )
        .bind(dish_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn list_favorites(&self) -> Result<FavoriteSet> {
        let rows = sqlx::query("SELECT dish_id FROM favorites")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| DishId(r.get::<i64, _>(0)))
            .collect())
    }

    async fn insert_favorite(&self, dish_id: DishId) -> Result<bool> {
        self.require_dish(dish_id).await?;
        let result = sqlx::query("INSERT OR IGNORE INTO favorites (dish_id) VALUES (?)")
            .bind(dish_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_comment(&self, new_comment: &NewComment) -> Result<Comment> {
        self.require_dish(new_comment.dish_id).await?;
        let created_at = Utc::now();
        let rec = sqlx::query(
            "INSERT INTO comments (dish_id, rating, author, comment, created_at)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(new_comment.dish_id.0)
        .bind(i64::from(new_comment.rating.get()))
        .bind(&new_comment.author)
        .bind(&new_comment.comment)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(Comment {
            id: CommentId(rec.get::<i64, _>(0)),
            dish_id: new_comment.dish_id,
            author: new_comment.author.clone(),
            rating: new_comment.rating,
            comment: new_comment.comment.clone(),
            date: created_at,
        })
    }

    async fn seed_dishes(&self, dishes: &[Dish]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for dish in dishes {
            sqlx::query(
                "INSERT INTO dishes (id, name, description, image, category, label, price, featured)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    name=excluded.name,
                    description=excluded.description,
                    image=excluded.image,
                    category=excluded.category,
                    label=excluded.label,
                    price=excluded.price,
                    featured=excluded.featured",
            )
            .bind(dish.id.0)
            .bind(&dish.name)
            .bind(&dish.description)
            .bind(&dish.image)
            .bind(dish.category.as_deref())
            .bind(dish.label.as_deref())
            .bind(dish.price.as_deref())
            .bind(dish.featured)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to seed dish {}", dish.id.0))?;
        }
        tx.commit().await?;
        tracing::debug!(count = dishes.len(), "seeded dishes");
        Ok(())
    }
}

impl Storage {
    async fn require_dish(&self, dish_id: DishId) -> Result<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM dishes WHERE id = ?")
            .bind(dish_id.0)
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => Ok(()),
            None => Err(anyhow!("unknown dish {}", dish_id.0)),
        }
    }
}

fn dish_from_row(r: &SqliteRow) -> Dish {
    Dish {
        id: DishId(r.get::<i64, _>(0)),
        name: r.get::<String, _>(1),
        description: r.get::<String, _>(2),
        image: r.get::<String, _>(3),
        category: r.get::<Option<String>, _>(4),
        label: r.get::<Option<String>, _>(5),
        price: r.get::<Option<String>, _>(6),
        featured: r.get::<bool, _>(7),
    }
}

fn comment_from_row(r: &SqliteRow) -> Result<Comment> {
    let raw_rating = r.get::<i64, _>(2);
    let rating = Rating::try_from(raw_rating)
        .with_context(|| format!("stored comment has invalid rating {raw_rating}"))?;
    Ok(Comment {
        id: CommentId(r.get::<i64, _>(0)),
        dish_id: DishId(r.get::<i64, _>(1)),
        rating,
        author: r.get::<String, _>(3),
        comment: r.get::<String, _>(4),
        date: r.get::<DateTime<Utc>, _>(5),
    })
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
