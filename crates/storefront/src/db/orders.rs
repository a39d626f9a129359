//! Orders: checkout and the customer's history.

use sqlx::PgPool;

use dar_koftan_core::{ColorVariantId, Order, OrderDetail, OrderItem, OrderId, ProductId, UserId};

use super::RepositoryError;
use crate::models::checkout::NewOrder;

/// Why a checkout could not be written.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Size {0} not found")]
    UnknownSize(String),

    #[error("Product with ID {0} not found")]
    UnknownProduct(ProductId),

    #[error("Color variant {color} not found for product {product_id}")]
    UnknownColor { color: String, product_id: ProductId },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(err.into())
    }
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Write a validated order and its lines in one transaction.
    ///
    /// Every line is resolved first: the size must exist, the product must
    /// exist and the color must name one of its variants. Product names and
    /// colors are copied onto the lines, and each product's `order_count`
    /// goes up by one per line. Stock is left alone.
    ///
    /// # Errors
    ///
    /// Returns an `OrderError` naming the first line that does not resolve,
    /// or `OrderError::Repository` if a query fails.
    pub async fn checkout(
        &self,
        order: &NewOrder,
        user_id: Option<UserId>,
    ) -> Result<OrderDetail, OrderError> {
        let mut tx = self.pool.begin().await?;

        let mut resolved = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let size_exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.size WHERE value = $1)")
                    .bind(&item.size)
                    .fetch_one(&mut *tx)
                    .await?;
            if !size_exists {
                return Err(OrderError::UnknownSize(item.size.clone()));
            }

            let product_name: String =
                sqlx::query_scalar("SELECT name FROM shop.product WHERE id = $1")
                    .bind(item.product_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or(OrderError::UnknownProduct(item.product_id))?;

            let color_id: ColorVariantId = sqlx::query_scalar(
                "SELECT id FROM shop.color_variant WHERE product_id = $1 AND color = $2 ORDER BY id LIMIT 1",
            )
            .bind(item.product_id)
            .bind(&item.color)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| OrderError::UnknownColor {
                color: item.color.clone(),
                product_id: item.product_id,
            })?;

            resolved.push((item, product_name, color_id));
        }

        let created = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO shop.customer_order
                (user_id, customer_name, phone_number, address, total_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(&order.customer_name)
        .bind(&order.phone_number)
        .bind(&order.address)
        .bind(order.total_amount)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(resolved.len());
        for (item, product_name, color_id) in resolved {
            let line = sqlx::query_as::<_, OrderItem>(
                r"
                INSERT INTO shop.order_item
                    (order_id, product_id, product_name, color_variant_id, color, size, quantity, price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                ",
            )
            .bind(created.id)
            .bind(item.product_id)
            .bind(product_name)
            .bind(color_id)
            .bind(&item.color)
            .bind(&item.size)
            .bind(item.quantity)
            .bind(item.price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(line);

            sqlx::query("UPDATE shop.product SET order_count = order_count + 1 WHERE id = $1")
                .bind(item.product_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(OrderDetail {
            order: created,
            items,
        })
    }

    /// A customer's orders with their lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn for_user(&self, user_id: UserId) -> Result<Vec<OrderDetail>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM shop.customer_order WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

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
