//! Short-lived cache for catalog-wide lookups.
//!
//! Category counts and the search facets are read on most pages but change
//! only when the back office edits the catalog, so they are cached for a
//! minute. Product data itself is never cached here.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use dar_koftan_core::CategoryCount;

use crate::db::{CatalogRepository, RepositoryError, SearchRepository};
use crate::models::catalog::SearchFacets;

const TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Categories,
    SearchFacets,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Arc<Vec<CategoryCount>>),
    SearchFacets(Arc<SearchFacets>),
}

/// Cache of catalog aggregates.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder().max_capacity(16).time_to_live(TTL).build();
        Self { cache }
    }

    /// Categories with product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup misses and the query fails.
    pub async fn categories(&self, pool: &PgPool) -> Result<Arc<Vec<CategoryCount>>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&CacheKey::Categories).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(CatalogRepository::new(pool).categories().await?);
        self.cache
            .insert(CacheKey::Categories, CacheValue::Categories(Arc::clone(&categories)))
            .await;
        Ok(categories)
    }

    /// Category names and price range for search metadata.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup misses and a query fails.
    pub async fn search_facets(&self, pool: &PgPool) -> Result<Arc<SearchFacets>, RepositoryError> {
        if let Some(CacheValue::SearchFacets(facets)) = self.cache.get(&CacheKey::SearchFacets).await {
            debug!("Cache hit for search facets");
            return Ok(facets);
        }

        let facets = Arc::new(SearchRepository::new(pool).facets().await?);
        self.cache
            .insert(CacheKey::SearchFacets, CacheValue::SearchFacets(Arc::clone(&facets)))
            .await;
        Ok(facets)
    }

    /// Drop everything.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::catalog::PriceRange;

    #[tokio::test]
    async fn test_cached_facets_are_served_without_database() {
        let cache = CatalogCache::new();
        let facets = SearchFacets {
            categories: vec!["Caftans".to_owned()],
            price_range: PriceRange::default(),
        };
        cache
            .cache
            .insert(CacheKey::SearchFacets, CacheValue::SearchFacets(Arc::new(facets.clone())))
            .await;

        // Never connects: a hit must not touch the pool.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let cached = cache.search_facets(&pool).await.unwrap();
        assert_eq!(*cached, facets);
    }

    #[tokio::test]
    async fn test_invalidate_all_empties_cache() {
        let cache = CatalogCache::new();
        cache
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(Arc::new(Vec::new())))
            .await;
        cache.invalidate_all().await;
        assert!(cache.cache.get(&CacheKey::Categories).await.is_none());
    }
}
