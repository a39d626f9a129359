//! Order repository for the back office.

use dar_koftan_core::{Order, OrderDetail, OrderId, OrderItem, OrderStatus};
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders with their lines, newest first, optionally for one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<OrderDetail>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT * FROM shop.customer_order
            WHERE $1::shop.order_status IS NULL OR status = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        self.with_items(orders).await
    }

    /// The most recent orders with their lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<OrderDetail>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM shop.customer_order ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        self.with_items(orders).await
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE shop.customer_order SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tracing::info!(order_id = %id, status = %status, "Order status changed");
        Ok(order)
    }

    async fn with_items(&self, orders: Vec<Order>) -> Result<Vec<OrderDetail>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM shop.order_item WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(OrderDetail::assemble(orders, items))
    }
}
