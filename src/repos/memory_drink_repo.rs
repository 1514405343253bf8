/*
 * Responsibility
 * - DB なしで動く DrinkStore 実装 (tests / ローカル確認用)
 * - Postgres 側と同じ制約 (title unique, id 単調増加) を守る
 */
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::{DrinkRow, DrinkStore, RepoError};

#[derive(Debug)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, DrinkRow>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|row| row.title == title && Some(row.id) != except)
    }
}

#[derive(Debug, Default)]
pub struct MemoryDrinkStore {
    inner: RwLock<Inner>,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn migrate(&self) -> Result<(), RepoError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), RepoError> {
        *self.inner.write().await = Inner::default();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DrinkRow>, RepoError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<DrinkRow>, RepoError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, title: &str, recipe: &str) -> Result<DrinkRow, RepoError> {
        let mut inner = self.inner.write().await;
        if inner.title_taken(title, None) {
            return Err(RepoError::Conflict);
        }

        let row = DrinkRow {
            id: inner.next_id,
            title: title.to_string(),
            recipe: recipe.to_string(),
        };
        inner.next_id += 1;
        inner.rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&str>,
    ) -> Result<Option<DrinkRow>, RepoError> {
        let mut inner = self.inner.write().await;
        if let Some(title) = title
            && inner.title_taken(title, Some(id))
        {
            return Err(RepoError::Conflict);
        }

        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            row.title = title.to_string();
        }
        if let Some(recipe) = recipe {
            row.recipe = recipe.to_string();
        }

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_assigned_in_order_and_never_reused() {
        let store = MemoryDrinkStore::new();
        let a = store.create("Water", "[]").await.unwrap();
        let b = store.create("Tea", "[]").await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(store.delete(b.id).await.unwrap());
        let c = store.create("Coffee", "[]").await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn duplicate_title_conflicts() {
        let store = MemoryDrinkStore::new();
        store.create("Water", "[]").await.unwrap();
        assert!(matches!(
            store.create("Water", "[]").await,
            Err(RepoError::Conflict)
        ));

        let tea = store.create("Tea", "[]").await.unwrap();
        assert!(matches!(
            store.update(tea.id, Some("Water"), None).await,
            Err(RepoError::Conflict)
        ));
        // renaming to its own title is fine
        assert!(store.update(tea.id, Some("Tea"), None).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_keeps_unspecified_fields() {
        let store = MemoryDrinkStore::new();
        let row = store.create("Water", "[1]").await.unwrap();

        let updated = store
            .update(row.id, None, Some("[2]"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Water");
        assert_eq!(updated.recipe, "[2]");

        assert!(store.update(99, Some("x"), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reset_empties_the_store() {
        let store = MemoryDrinkStore::new();
        store.create("Water", "[]").await.unwrap();
        store.reset().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.create("Tea", "[]").await.unwrap().id, 1);
    }
}
