//! Catalog query parameters and response shapes.

use dar_koftan_core::{Price, ProductDetail, ProductId};
use serde::{Deserialize, Serialize};

/// How many products the home and top-sales rails show.
pub const RAIL_SIZE: usize = 8;
/// How many related products the product page suggests.
pub const SUGGESTION_LIMIT: i64 = 5;

/// Sort orders accepted by the product list and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    Newest,
    /// Id ascending for the catalog, id descending for search.
    #[default]
    Default,
}

impl ProductSort {
    /// Unknown values fall back to [`ProductSort::Default`].
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price-asc") => Self::PriceAsc,
            Some("price-desc") => Self::PriceDesc,
            Some("newest") => Self::Newest,
            _ => Self::Default,
        }
    }

    /// `ORDER BY` body for this sort. `default` is used for [`ProductSort::Default`].
    #[must_use]
    pub const fn order_by(self, default: &'static str) -> &'static str {
        match self {
            Self::PriceAsc => "price ASC, id ASC",
            Self::PriceDesc => "price DESC, id ASC",
            Self::Newest => "created_at DESC, id DESC",
            Self::Default => default,
        }
    }
}

/// `GET /api/products` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
    /// Name slug from the product URL, words separated by `-`.
    pub product: Option<String>,
}

/// Filters for the catalog list, after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub name: Option<String>,
    pub sort: ProductSort,
}

impl From<ProductListQuery> for ProductFilter {
    fn from(query: ProductListQuery) -> Self {
        Self {
            category: category_filter(query.category),
            name: query
                .product
                .map(|slug| slug.replace('-', " ").trim().to_string())
                .filter(|name| !name.is_empty()),
            sort: ProductSort::parse(query.sort.as_deref()),
        }
    }
}

/// `category=all` and an empty category mean no filter.
#[must_use]
pub fn category_filter(category: Option<String>) -> Option<String> {
    category.filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
}

/// A `LIKE` pattern matching `needle` anywhere, with wildcards in it escaped.
#[must_use]
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsQuery {
    pub category: Option<String>,
    pub exclude: Option<ProductId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuery {
    pub size: Option<String>,
    pub color_id: Option<i32>,
}

/// `GET /api/sizes` query string.
#[derive(Debug, Clone, Deserialize)]
pub struct SizeQuery {
    pub value: Option<String>,
}

/// `GET /api/search` query string. `query` wins over `q`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
}

/// Search filters, after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub text: String,
    pub category: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub sort: ProductSort,
}

impl SearchParams {
    /// `None` when there is nothing to search for. Unparseable prices are ignored.
    #[must_use]
    pub fn into_filter(self) -> Option<SearchFilter> {
        let text = self
            .query
            .filter(|q| !q.trim().is_empty())
            .or(self.q)
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())?;

        Some(SearchFilter {
            text,
            category: category_filter(self.category),
            min_price: parse_price(self.min_price.as_deref()),
            max_price: parse_price(self.max_price.as_deref()),
            sort: ProductSort::parse(self.sort_by.as_deref()),
        })
    }
}

fn parse_price(value: Option<&str>) -> Option<Price> {
    value?.trim().parse().ok().map(Price::new)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub categories: Vec<String>,
    pub price_range: PriceRange,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub products: Vec<ProductDetail>,
    pub metadata: SearchMetadata,
}

/// Catalog-wide facts shown next to search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFacets {
    pub categories: Vec<String>,
    pub price_range: PriceRange,
}

/// Shortest query the suggestion box answers.
pub const MIN_SUGGESTION_QUERY: usize = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductSuggestion {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub sale_price: Option<Price>,
    pub image_url: Option<String>,
    #[sqlx(skip)]
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySuggestion {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    #[default]
    Product,
    Category,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Suggestions {
    pub products: Vec<ProductSuggestion>,
    pub categories: Vec<CategorySuggestion>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_sort_parse_falls_back_to_default() {
        assert_eq!(ProductSort::parse(Some("price-desc")), ProductSort::PriceDesc);
        assert_eq!(ProductSort::parse(Some("newest")), ProductSort::Newest);
        assert_eq!(ProductSort::parse(Some("relevance")), ProductSort::Default);
        assert_eq!(ProductSort::parse(None), ProductSort::Default);
        assert_eq!(ProductSort::Default.order_by("id DESC"), "id DESC");
    }

    #[test]
    fn test_list_filter_from_query() {
        let filter = ProductFilter::from(ProductListQuery {
            category: Some("All".to_string()),
            sort: Some("price-asc".to_string()),
            product: Some("koftan-zahra-".to_string()),
        });

        assert_eq!(filter.category, None);
        assert_eq!(filter.name.as_deref(), Some("koftan zahra"));
        assert_eq!(filter.sort, ProductSort::PriceAsc);
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("jebba"), "%jebba%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_search_params_prefer_query_over_q() {
        let filter = SearchParams {
            query: Some("  caftan ".to_string()),
            q: Some("jebba".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.text, "caftan");

        let filter = SearchParams {
            query: Some(String::new()),
            q: Some("jebba".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.text, "jebba");
    }

    #[test]
    fn test_search_params_empty_query_is_none() {
        assert!(SearchParams::default().into_filter().is_none());
        let blank = SearchParams {
            q: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.into_filter().is_none());
    }

    #[test]
    fn test_search_prices_parse_or_are_ignored() {
        let filter = SearchParams {
            q: Some("robe".to_string()),
            min_price: Some("49.9".to_string()),
            max_price: Some("cheap".to_string()),
            category: Some("all".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.min_price, Some(Price::new(Decimal::new(4990, 2))));
        assert_eq!(filter.max_price, None);
        assert_eq!(filter.category, None);
    }

    #[test]
    fn test_suggestion_serializes_type_tag() {
        let json = serde_json::to_value(CategorySuggestion {
            name: "jebba".to_string(),
            kind: SuggestionKind::Category,
        })
        .unwrap();
        assert_eq!(json["type"], "category");
    }
}
