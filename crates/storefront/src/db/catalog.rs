//! Read side of the catalog: products, sizes, categories and stock.

use dar_koftan_core::{
    CategoryCount, ColorVariant, ColorVariantId, Product, ProductDetail, ProductId, ProductImage,
    Size, Stock,
};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::catalog::{ProductFilter, RAIL_SIZE, SUGGESTION_LIMIT, contains_pattern};

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Products matching `filter`, with variants and images.
    ///
    /// The category matches case-insensitively; the name matches anywhere.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<ProductDetail>, RepositoryError> {
        let sql = format!(
            r"
            SELECT * FROM shop.product
            WHERE ($1::text IS NULL OR LOWER(category) = LOWER($1))
              AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY {}
            ",
            filter.sort.order_by("id ASC")
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.name.as_deref().map(contains_pattern))
            .fetch_all(self.pool)
            .await?;

        self.load_details(products, false).await
    }

    /// The home page rail: flagged products that have at least one image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn home(&self) -> Result<Vec<ProductDetail>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT * FROM shop.product
            WHERE show_in_home
            ORDER BY priority DESC, created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let mut details = self.load_details(products, false).await?;
        details.retain(ProductDetail::has_images);
        details.truncate(RAIL_SIZE);
        Ok(details)
    }

    /// Best sellers by order count, padded with high-priority products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn top_sales(&self) -> Result<Vec<ProductDetail>, RepositoryError> {
        let limit = i64::try_from(RAIL_SIZE).unwrap_or(i64::MAX);

        let mut products = sqlx::query_as::<_, Product>(
            r"
            SELECT * FROM shop.product p
            WHERE EXISTS (SELECT 1 FROM shop.order_item i WHERE i.product_id = p.id)
            ORDER BY order_count DESC, priority DESC, id ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        if products.len() < RAIL_SIZE {
            let taken: Vec<ProductId> = products.iter().map(|p| p.id).collect();
            let remaining = limit - i64::try_from(products.len()).unwrap_or(limit);
            let padding = sqlx::query_as::<_, Product>(
                r"
                SELECT * FROM shop.product
                WHERE NOT (id = ANY($1))
                ORDER BY priority DESC, id ASC
                LIMIT $2
                ",
            )
            .bind(&taken)
            .bind(remaining)
            .fetch_all(self.pool)
            .await?;
            products.extend(padding);
        }

        self.load_details(products, true).await
    }

    /// Flagged products that carry a sale price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn promo(&self) -> Result<Vec<ProductDetail>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT * FROM shop.product
            WHERE show_in_promo AND sale_price IS NOT NULL
            ORDER BY priority DESC, created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.load_details(products, false).await
    }

    /// The six most recently added products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn latest(&self) -> Result<Vec<ProductDetail>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM shop.product ORDER BY created_at DESC, id DESC LIMIT 6",
        )
        .fetch_all(self.pool)
        .await?;

        self.load_details(products, false).await
    }

    /// Other products of the same category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn suggestions(
        &self,
        category: &str,
        exclude: Option<ProductId>,
    ) -> Result<Vec<ProductDetail>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT * FROM shop.product
            WHERE category = $1 AND ($2::int IS NULL OR id <> $2)
            ORDER BY priority DESC, id ASC
            LIMIT $3
            ",
        )
        .bind(category)
        .bind(exclude)
        .bind(SUGGESTION_LIMIT)
        .fetch_all(self.pool)
        .await?;

        self.load_details(products, false).await
    }

    /// One product with variants, images and stock, counting the view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn view(&self, id: ProductId) -> Result<ProductDetail, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE shop.product SET view_count = view_count + 1 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        self.load_details(vec![product], true)
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    /// Stock rows of one size of one color, every location.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stock_for(
        &self,
        product_id: ProductId,
        color_id: ColorVariantId,
        size: &str,
    ) -> Result<Vec<Stock>, RepositoryError> {
        let rows = sqlx::query_as::<_, Stock>(
            r"
            SELECT * FROM shop.stock
            WHERE product_id = $1 AND color_id = $2 AND size = $3
            ORDER BY location
            ",
        )
        .bind(product_id)
        .bind(color_id)
        .bind(size)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Look a size up by its label.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn size(&self, value: &str) -> Result<Option<Size>, RepositoryError> {
        let size = sqlx::query_as::<_, Size>("SELECT * FROM shop.size WHERE value = $1")
            .bind(value)
            .fetch_optional(self.pool)
            .await?;
        Ok(size)
    }

    /// Every category with how many products use it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<CategoryCount>, RepositoryError> {
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

    /// Attach variants, images and optionally stock rows to `products`.
    pub(crate) async fn load_details(
        &self,
        products: Vec<Product>,
        with_stock: bool,
    ) -> Result<Vec<ProductDetail>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();

        let variants = sqlx::query_as::<_, ColorVariant>(
            "SELECT * FROM shop.color_variant WHERE product_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let images = sqlx::query_as::<_, ProductImage>(
            r"
            SELECT i.* FROM shop.product_image i
            JOIN shop.color_variant v ON v.id = i.color_variant_id
            WHERE v.product_id = ANY($1)
            ORDER BY i.id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let stocks = if with_stock {
            sqlx::query_as::<_, Stock>(
                "SELECT * FROM shop.stock WHERE product_id = ANY($1) ORDER BY size, location",
            )
            .bind(&ids)
            .fetch_all(self.pool)
            .await?
        } else {
            Vec::new()
        };

        Ok(ProductDetail::assemble(products, variants, images, stocks))
    }
}
