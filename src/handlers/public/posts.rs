use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::config;
use crate::error::ApiResult;
use crate::handlers::parse_doc_id;
use crate::state::AppState;
use crate::store::{names, DocFilter, FindOptions};

/// Long-form field whose character length ranks the featured posts.
pub(crate) const FEATURED_RANK_FIELD: &str = "description";

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Zero-based page index
    pub page: Option<i64>,
    /// Page size; uncapped unless the deployment configures a cap
    pub size: Option<i64>,
}

/// GET /all-post?page&size - newest first, `size` per page
pub async fn all_post(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Value>> {
    let page = query.page.unwrap_or(0).max(0);
    let mut size = query.size.unwrap_or(10).max(0);
    if let Some(cap) = config::config().store.max_page_size {
        size = size.min(cap);
    }

    let docs = state
        .store
        .collection(names::POSTS)?
        .find(DocFilter::new(), FindOptions::page(page, size))
        .await?;
    Ok(Json(Value::Array(docs)))
}

/// GET /post/:id - one post; a miss is a 200 with a null body
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_doc_id(&id)?;
    let doc = state.store.collection(names::POSTS)?.find_one_by_id(id).await?;
    Ok(Json(doc.unwrap_or(Value::Null)))
}

/// GET /blog-by-category/:name - posts in one category, newest first
pub async fn blog_by_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let docs = state
        .store
        .collection(names::POSTS)?
        .find(DocFilter::new().eq("category", name), FindOptions::newest_first())
        .await?;
    Ok(Json(Value::Array(docs)))
}

/// GET /featured-post-home - all posts ranked by description length,
/// longest first. The singular name is historical; this returns the whole
/// ranked array.
pub async fn featured_home(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let docs = state
        .store
        .collection(names::POSTS)?
        .rank_by_text_length(DocFilter::new(), FEATURED_RANK_FIELD)
        .await?;
    Ok(Json(Value::Array(docs)))
}
