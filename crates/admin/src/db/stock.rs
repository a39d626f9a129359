//! Stock ledger repository.

use std::collections::HashMap;

use dar_koftan_core::stock::{
    AggregationSummary, BatchUpdateError, filter_batch_updates, plan_online_stock,
};
use dar_koftan_core::{Stock, StockId, StockLocation};
use sqlx::PgPool;
use thiserror::Error;

use super::RepositoryError;

/// Why a batch stock update did not apply.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Rejected(#[from] BatchUpdateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for BatchError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(err.into())
    }
}

/// Repository for stock ledger operations.
pub struct StockRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StockRepository<'a> {
    /// Create a new stock repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Set one counter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no stock row has this id.
    pub async fn set_quantity(&self, id: StockId, quantity: i32) -> Result<Stock, RepositoryError> {
        sqlx::query_as::<_, Stock>(
            "UPDATE shop.stock SET quantity = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Apply a batch of quantity changes in one transaction.
    ///
    /// Ids that do not exist or belong to the online location are dropped.
    /// Either every remaining row is updated or none is.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Rejected` for a negative quantity or when no
    /// valid id remains, and `BatchError::Repository` if a write fails.
    pub async fn apply_batch(
        &self,
        requested: &HashMap<StockId, i32>,
    ) -> Result<Vec<Stock>, BatchError> {
        let ids: Vec<StockId> = requested.keys().copied().collect();
        let mut tx = self.pool.begin().await?;

        let existing: HashMap<StockId, StockLocation> = sqlx::query_as::<_, (StockId, StockLocation)>(
            "SELECT id, location FROM shop.stock WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let valid = filter_batch_updates(requested, &existing)?;

        let mut updated = Vec::with_capacity(valid.len());
        for (id, quantity) in valid {
            let stock = sqlx::query_as::<_, Stock>(
                "UPDATE shop.stock SET quantity = $2 WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;
            updated.push(stock);
        }

        tx.commit().await?;

        tracing::info!(
            requested = requested.len(),
            updated = updated.len(),
            "Batch stock update applied"
        );
        Ok(updated)
    }

    /// Create the missing online rows as the sum of the physical rows.
    ///
    /// Existing online rows are left alone. The sweep runs in one
    /// transaction: any failure, including a concurrent insert of the same
    /// online row, rolls back every insert and is reported as a database
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn aggregate_online(&self) -> Result<AggregationSummary, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::Database)?;

        let rows = sqlx::query_as::<_, Stock>("SELECT * FROM shop.stock ORDER BY id")
            .fetch_all(&mut *tx)
            .await
            .map_err(RepositoryError::Database)?;

        let plan = plan_online_stock(&rows);

        for row in &plan.to_create {
            sqlx::query(
                r"
                INSERT INTO shop.stock (product_id, color_id, size, location, quantity)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(row.key.product_id)
            .bind(row.key.color_id)
            .bind(&row.key.size)
            .bind(StockLocation::Online)
            .bind(row.quantity)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::Database)?;
        }

        tx.commit().await.map_err(RepositoryError::Database)?;

        let summary = AggregationSummary::from(&plan);
        tracing::info!(
            created = summary.created,
            skipped = summary.skipped,
            "Online stock aggregation complete"
        );
        Ok(summary)
    }
}
