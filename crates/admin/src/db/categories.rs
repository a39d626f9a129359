//! Category repository.

use dar_koftan_core::{Category, CategoryCount};
use sqlx::PgPool;

use super::RepositoryError;

/// Category products are moved to when theirs is deleted.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every category with how many products use it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryCount>(
            r"
            SELECT c.id, c.name, c.description, c.category_group,
                   COUNT(p.id) AS product_count
            FROM shop.category c
            LEFT JOIN shop.product p ON p.category = c.name
            GROUP BY c.id
            ORDER BY c.name
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        group: Option<&str>,
    ) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.category (name, description, category_group)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(name)
        .bind(description)
        .bind(group)
        .fetch_one(self.pool)
        .await?;
        Ok(category)
    }

    /// Delete a category and move its products to [`UNCATEGORIZED`].
    ///
    /// Returns how many products were moved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this name.
    pub async fn delete(&self, name: &str) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM shop.category WHERE name = $1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("INSERT INTO shop.category (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(UNCATEGORIZED)
            .execute(&mut *tx)
            .await?;

        let moved = sqlx::query("UPDATE shop.product SET category = $2 WHERE category = $1")
            .bind(name)
            .bind(UNCATEGORIZED)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::info!(category = %name, moved, "Category deleted");
        Ok(moved)
    }
}
