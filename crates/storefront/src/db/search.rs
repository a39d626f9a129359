//! Text search over the catalog.

use dar_koftan_core::{Price, Product, ProductDetail};
use sqlx::PgPool;

use super::{CatalogRepository, RepositoryError};
use crate::models::catalog::{
    CategorySuggestion, PriceRange, ProductSuggestion, SearchFacets, SearchFilter,
    SuggestionKind, Suggestions, contains_pattern,
};

const PRODUCT_SUGGESTIONS: i64 = 5;
const CATEGORY_SUGGESTIONS: i64 = 3;

/// Repository for catalog search.
pub struct SearchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SearchRepository<'a> {
    /// Create a new search repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Products whose name, description or category contains the text,
    /// case-insensitively, narrowed by category and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<ProductDetail>, RepositoryError> {
        let sql = format!(
            r"
            SELECT * FROM shop.product
            WHERE (name ILIKE $1 OR description ILIKE $1 OR category ILIKE $1)
              AND ($2::text IS NULL OR LOWER(category) = LOWER($2))
              AND ($3::numeric IS NULL OR price >= $3)
              AND ($4::numeric IS NULL OR price <= $4)
            ORDER BY {}
            ",
            filter.sort.order_by("id DESC")
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(contains_pattern(&filter.text))
            .bind(filter.category.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .fetch_all(self.pool)
            .await?;

        CatalogRepository::new(self.pool)
            .load_details(products, false)
            .await
    }

    /// Every category name and the catalog's price range.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn facets(&self) -> Result<SearchFacets, RepositoryError> {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT name FROM shop.category ORDER BY name")
                .fetch_all(self.pool)
                .await?;

        let (min, max): (Option<Price>, Option<Price>) =
            sqlx::query_as("SELECT MIN(price), MAX(price) FROM shop.product")
                .fetch_one(self.pool)
                .await?;

        Ok(SearchFacets {
            categories,
            price_range: PriceRange {
                min: min.unwrap_or(Price::ZERO),
                max: max.unwrap_or(Price::ZERO),
            },
        })
    }

    /// A handful of products and categories for the search box.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn suggestions(&self, text: &str) -> Result<Suggestions, RepositoryError> {
        let pattern = contains_pattern(text);

        let products = sqlx::query_as::<_, ProductSuggestion>(
            r"
            SELECT p.id, p.name, p.category, p.price, p.sale_price,
                   (SELECT i.url
                    FROM shop.color_variant v
                    JOIN shop.product_image i ON i.color_variant_id = v.id
                    WHERE v.product_id = p.id AND i.is_main
                    ORDER BY v.id, i.id
                    LIMIT 1) AS image_url
            FROM shop.product p
            WHERE p.name ILIKE $1 OR p.description ILIKE $1 OR p.category ILIKE $1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2
            ",
        )
        .bind(&pattern)
        .bind(PRODUCT_SUGGESTIONS)
        .fetch_all(self.pool)
        .await?;

        let categories = sqlx::query_scalar::<_, String>(
            "SELECT name FROM shop.category WHERE name ILIKE $1 ORDER BY name LIMIT $2",
        )
        .bind(&pattern)
        .bind(CATEGORY_SUGGESTIONS)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|name| CategorySuggestion {
            name,
            kind: SuggestionKind::Category,
        })
        .collect();

        Ok(Suggestions {
            products,
            categories,
        })
    }
}
