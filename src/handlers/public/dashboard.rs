use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::store::{names, DocFilter};

/// GET /dashboard-count - per-collection document counts
pub async fn count(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let posts = state.store.collection(names::POSTS)?.count(DocFilter::new()).await?;
    let categories = state.store.collection(names::CATEGORIES)?.count(DocFilter::new()).await?;
    let comments = state.store.collection(names::COMMENTS)?.count(DocFilter::new()).await?;
    let users = state.store.collection(names::USERS)?.count(DocFilter::new()).await?;

    Ok(Json(json!({
        "posts": posts,
        "categories": categories,
        "comments": comments,
        "users": users,
    })))
}
