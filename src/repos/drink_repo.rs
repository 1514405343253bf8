/*
 * Responsibility
 * - drinks テーブル向け SQLx 操作
 * - recipe は JSON 文字列のまま保持する (解釈は API 境界で行う)
 * - DB エラーは RepoError に変換して返す (unique 違反は Conflict)
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DrinkRow {
    pub id: i64,
    pub title: String,
    pub recipe: String,
}

/// Persistence seam for drinks.
///
/// `recipe` arguments are already-serialized JSON text.
#[async_trait]
pub trait DrinkStore: Send + Sync + 'static {
    // Returns the store backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Create the schema if it does not exist yet.
    async fn migrate(&self) -> Result<(), RepoError>;

    // Drop everything and recreate an empty schema.
    async fn reset(&self) -> Result<(), RepoError>;

    async fn list(&self) -> Result<Vec<DrinkRow>, RepoError>;

    async fn get(&self, id: i64) -> Result<Option<DrinkRow>, RepoError>;

    async fn create(&self, title: &str, recipe: &str) -> Result<DrinkRow, RepoError>;

    // `None` fields are left untouched. Returns `None` if the id does not exist.
    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&str>,
    ) -> Result<Option<DrinkRow>, RepoError>;

    // Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

#[derive(Clone, Debug)]
pub struct PgDrinkStore {
    db: PgPool,
}

impl PgDrinkStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn migrate(&self) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS drinks (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR(80) NOT NULL UNIQUE,
                recipe TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn reset(&self) -> Result<(), RepoError> {
        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&self.db)
            .await?;

        self.migrate().await
    }

    async fn list(&self) -> Result<Vec<DrinkRow>, RepoError> {
        let rows = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drinks
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<DrinkRow>, RepoError> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drinks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn create(&self, title: &str, recipe: &str) -> Result<DrinkRow, RepoError> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(title)
        .bind(recipe)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&str>,
    ) -> Result<Option<DrinkRow>, RepoError> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drinks
            SET
                title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(recipe)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM drinks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
