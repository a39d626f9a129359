//! Product repository: catalog CRUD with variants, images and stock rows.

use std::collections::HashSet;

use dar_koftan_core::stock::{INITIAL_QUANTITY_PER_LOCATION, initial_stock};
use dar_koftan_core::{
    ColorVariant, ColorVariantId, Product, ProductDetail, ProductId, ProductImage, Stock,
};
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;
use crate::models::{DisplayUpdate, ImageInput, ProductInput};

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, newest first, with variants and images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<ProductDetail>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM shop.product ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        let mut conn = self.pool.acquire().await?;
        load_details(&mut conn, products, false).await
    }

    /// All products with variants, images and every stock row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_with_stock(&self) -> Result<Vec<ProductDetail>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM shop.product ORDER BY name, id")
            .fetch_all(self.pool)
            .await?;

        let mut conn = self.pool.acquire().await?;
        load_details(&mut conn, products, true).await
    }

    /// One product with variants, images and stock rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn get(&self, id: ProductId) -> Result<ProductDetail, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        get_detail(&mut conn, id).await
    }

    /// Create a product with its variants, images and starting stock.
    ///
    /// Each variant gets `INITIAL_QUANTITY_PER_LOCATION` units of every size
    /// at every physical shop, and an online row holding their sum.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    pub async fn create(&self, input: &ProductInput) -> Result<ProductDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        upsert_category(&mut tx, &input.category).await?;

        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO shop.product
                (name, description, price, sale_price, category, sizes, collaborator)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.sale_price)
        .bind(&input.category)
        .bind(&input.sizes)
        .bind(&input.collaborator)
        .fetch_one(&mut *tx)
        .await?;

        for variant in &input.color_variants {
            let variant_id = insert_variant(&mut tx, product.id, &variant.color).await?;
            insert_images(&mut tx, variant_id, &variant.images, true).await?;
            insert_initial_stock(&mut tx, product.id, variant_id, &input.sizes).await?;
        }

        let detail = get_detail(&mut tx, product.id).await?;
        tx.commit().await?;

        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(detail)
    }

    /// Replace a product's fields and reconcile its variants and stock.
    ///
    /// Variants are matched by color: new colors are created with starting
    /// stock, colors missing from `input` are deleted along with their
    /// images and stock. Image urls not already on a kept variant are
    /// appended. Stock rows are added for new sizes and removed for sizes
    /// no longer offered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<ProductDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Product>(
            "SELECT * FROM shop.product WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        upsert_category(&mut tx, &input.category).await?;

        sqlx::query(
            r"
            UPDATE shop.product
            SET name = $2, description = $3, price = $4, sale_price = $5,
                category = $6, sizes = $7, collaborator = $8
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.sale_price)
        .bind(&input.category)
        .bind(&input.sizes)
        .bind(&input.collaborator)
        .execute(&mut *tx)
        .await?;

        let existing = sqlx::query_as::<_, ColorVariant>(
            "SELECT * FROM shop.color_variant WHERE product_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let old_sizes: HashSet<&str> = current.sizes.iter().map(String::as_str).collect();
        let new_sizes: HashSet<&str> = input.sizes.iter().map(String::as_str).collect();
        let added_sizes: Vec<String> = input
            .sizes
            .iter()
            .filter(|s| !old_sizes.contains(s.as_str()))
            .cloned()
            .collect();
        let removed_sizes: Vec<String> = current
            .sizes
            .iter()
            .filter(|s| !new_sizes.contains(s.as_str()))
            .cloned()
            .collect();

        for variant in &input.color_variants {
            if let Some(kept) = existing.iter().find(|v| v.color == variant.color) {
                let known_urls: Vec<String> = sqlx::query_scalar(
                    "SELECT url FROM shop.product_image WHERE color_variant_id = $1",
                )
                .bind(kept.id)
                .fetch_all(&mut *tx)
                .await?;

                let fresh: Vec<ImageInput> = variant
                    .images
                    .iter()
                    .filter(|i| !known_urls.contains(&i.url))
                    .cloned()
                    .collect();
                insert_images(&mut tx, kept.id, &fresh, known_urls.is_empty()).await?;
                insert_initial_stock(&mut tx, id, kept.id, &added_sizes).await?;
            } else {
                let variant_id = insert_variant(&mut tx, id, &variant.color).await?;
                insert_images(&mut tx, variant_id, &variant.images, true).await?;
                insert_initial_stock(&mut tx, id, variant_id, &input.sizes).await?;
            }
        }

        let dropped: Vec<ColorVariantId> = existing
            .iter()
            .filter(|v| !input.color_variants.iter().any(|i| i.color == v.color))
            .map(|v| v.id)
            .collect();
        if !dropped.is_empty() {
            sqlx::query("DELETE FROM shop.color_variant WHERE id = ANY($1)")
                .bind(&dropped)
                .execute(&mut *tx)
                .await?;
        }

        if !removed_sizes.is_empty() {
            sqlx::query("DELETE FROM shop.stock WHERE product_id = $1 AND size = ANY($2)")
                .bind(id)
                .bind(&removed_sizes)
                .execute(&mut *tx)
                .await?;
        }

        let detail = get_detail(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(
            product_id = %id,
            dropped_variants = dropped.len(),
            added_sizes = added_sizes.len(),
            removed_sizes = removed_sizes.len(),
            "Product updated"
        );
        Ok(detail)
    }

    /// Delete a product. Variants, images and stock rows cascade; order
    /// lines keep their snapshot with the product reference cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Change the storefront display flags and priority.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn update_display(
        &self,
        id: ProductId,
        update: &DisplayUpdate,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE shop.product
            SET show_in_home = COALESCE($2, show_in_home),
                show_in_promo = COALESCE($3, show_in_promo),
                show_in_top_sales = COALESCE($4, show_in_top_sales),
                priority = COALESCE($5, priority)
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(update.show_in_home)
        .bind(update.show_in_promo)
        .bind(update.show_in_top_sales)
        .bind(update.priority)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

async fn get_detail(conn: &mut PgConnection, id: ProductId) -> Result<ProductDetail, RepositoryError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM shop.product WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    load_details(conn, vec![product], true)
        .await?
        .pop()
        .ok_or(RepositoryError::NotFound)
}

/// Attach variants, images and optionally stock rows to `products`.
async fn load_details(
    conn: &mut PgConnection,
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
    .fetch_all(&mut *conn)
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
    .fetch_all(&mut *conn)
    .await?;

    let stocks = if with_stock {
        sqlx::query_as::<_, Stock>(
            "SELECT * FROM shop.stock WHERE product_id = ANY($1) ORDER BY size, location",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?
    } else {
        Vec::new()
    };

    Ok(ProductDetail::assemble(products, variants, images, stocks))
}

async fn upsert_category(conn: &mut PgConnection, name: &str) -> Result<(), RepositoryError> {
    sqlx::query("INSERT INTO shop.category (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
        .bind(name)
        .execute(conn)
        .await?;
    Ok(())
}

async fn insert_variant(
    conn: &mut PgConnection,
    product_id: ProductId,
    color: &str,
) -> Result<ColorVariantId, RepositoryError> {
    let id = sqlx::query_scalar::<_, ColorVariantId>(
        "INSERT INTO shop.color_variant (product_id, color) VALUES ($1, $2) RETURNING id",
    )
    .bind(product_id)
    .bind(color)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Insert images in order. When `first_is_main` is set the first one becomes
/// the variant's main image.
async fn insert_images(
    conn: &mut PgConnection,
    variant_id: ColorVariantId,
    images: &[ImageInput],
    first_is_main: bool,
) -> Result<(), RepositoryError> {
    for (index, image) in images.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO shop.product_image (color_variant_id, url, alt, is_main, position)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(variant_id)
        .bind(image.url.trim())
        .bind(&image.alt)
        .bind(first_is_main && index == 0)
        .bind(image.position())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_initial_stock(
    conn: &mut PgConnection,
    product_id: ProductId,
    variant_id: ColorVariantId,
    sizes: &[String],
) -> Result<(), RepositoryError> {
    for (size, location, quantity) in initial_stock(sizes, INITIAL_QUANTITY_PER_LOCATION) {
        sqlx::query(
            r"
            INSERT INTO shop.stock (product_id, color_id, size, location, quantity)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (product_id, color_id, size, location) DO NOTHING
            ",
        )
        .bind(product_id)
        .bind(variant_id)
        .bind(size)
        .bind(location)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
