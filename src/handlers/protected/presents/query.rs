use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::app::AppState;
use crate::database::Present;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
}

/// GET /api/present-query/wishlist/:wishlist_id
pub async fn wishlist_presents(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    Path(wishlist_id): Path<String>,
) -> ApiResult<Vec<Present>> {
    let presents = state.queries.load_wishlist_presents(&wishlist_id, &cancel).await?;
    Ok(ApiResponse::success(presents))
}

/// GET /api/present-query/wishlist/:wishlist_id/unreserved
pub async fn wishlist_unreserved_presents(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    Path(wishlist_id): Path<String>,
) -> ApiResult<Vec<Present>> {
    let presents = state
        .queries
        .load_wishlist_unreserved_presents(&wishlist_id, &cancel)
        .await?;
    Ok(ApiResponse::success(presents))
}

/// GET /api/present-query/search?keyword=... - a missing keyword searches for nothing
pub async fn search_presents(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Present>> {
    let keyword = query.keyword.unwrap_or_default();
    let presents = state.queries.search_presents_by_keyword(&keyword, &cancel).await?;
    Ok(ApiResponse::success(presents))
}

/// GET /api/present-query/reserved/:user_id
pub async fn reserved_presents(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Present>> {
    let presents = state.queries.load_reserved_presents(&user_id, &cancel).await?;
    Ok(ApiResponse::success(presents))
}
