//! Search route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use tracing::instrument;

use crate::db::SearchRepository;
use crate::error::AppError;
use crate::models::catalog::{
    MIN_SUGGESTION_QUERY, SearchMetadata, SearchParams, SearchResults, SuggestionQuery,
    Suggestions,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/search/suggestions", get(suggestions))
}

/// Full search. An empty query still returns the metadata so the filter
/// panel can render.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, AppError> {
    let facets = state.cache().search_facets(state.pool()).await?;

    let products = match params.into_filter() {
        Some(filter) => SearchRepository::new(state.pool()).search(&filter).await?,
        None => Vec::new(),
    };

    let metadata = SearchMetadata {
        categories: facets.categories.clone(),
        price_range: facets.price_range,
        total: products.len(),
    };

    Ok(Json(SearchResults { products, metadata }))
}

/// Search-as-you-type box.
#[instrument(skip(state))]
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Suggestions>, AppError> {
    let text = query.q.as_deref().map(str::trim).unwrap_or_default();
    if text.chars().count() < MIN_SUGGESTION_QUERY {
        return Ok(Json(Suggestions::default()));
    }

    let suggestions = SearchRepository::new(state.pool()).suggestions(text).await?;
    Ok(Json(suggestions))
}
