use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::domain::{Comment, Dish};
use storage::{Storage, StoreBackend};

const BUNDLED_CATALOG: &str = include_str!("../catalog.json");

#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub dishes: Vec<Dish>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Catalog {
    pub fn bundled() -> Result<Self> {
        serde_json::from_str(BUNDLED_CATALOG).context("bundled catalog is malformed")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse catalog '{}'", path.display()))
    }

    pub async fn seed(&self, storage: &Storage) -> Result<()> {
        storage.seed_dishes(&self.dishes).await?;
        storage.seed_comments(&self.comments).await?;
        tracing::info!(
            dishes = self.dishes.len(),
            comments = self.comments.len(),
            "catalog seeded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_uses_ordinal_dish_ids() {
        let catalog = Catalog::bundled().expect("catalog");
        for (position, dish) in catalog.dishes.iter().enumerate() {
            assert_eq!(dish.id.0, position as i64);
        }
        assert!(catalog
            .comments
            .iter()
            .all(|c| (c.dish_id.0 as usize) < catalog.dishes.len()));
    }

    #[test]
    fn rejects_out_of_range_comment_rating() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"dishes":[],"comments":[{"id":0,"dish_id":0,"rating":7,"comment":"","author":"","date":"2015-02-13T17:57:28Z"}]}"#,
        )
        .expect("write");
        let err = Catalog::from_path(&path).expect_err("bad rating");
        assert!(format!("{err:#}").contains("rating 7"));
    }

    #[tokio::test]
    async fn seeding_is_repeatable() {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        let catalog = Catalog::bundled().expect("catalog");
        catalog.seed(&storage).await.expect("seed");
        catalog.seed(&storage).await.expect("reseed");

        assert_eq!(storage.list_dishes().await.expect("dishes").len(), 4);
        assert_eq!(storage.list_comments().await.expect("comments").len(), 4);
    }
}
