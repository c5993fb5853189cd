use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiResult;
use crate::handlers::parse_doc_id;
use crate::state::AppState;
use crate::store::{names, DocFilter, FindOptions};

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    #[serde(rename = "postId")]
    pub post_id: Option<String>,
}

/// GET /comments?postId - comments, optionally scoped to one post
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CommentsQuery>,
) -> ApiResult<Json<Value>> {
    let mut filter = DocFilter::new();
    if let Some(post_id) = query.post_id {
        filter = filter.eq("postId", post_id);
    }

    let docs = state
        .store
        .collection(names::COMMENTS)?
        .find(filter, FindOptions::default())
        .await?;
    Ok(Json(Value::Array(docs)))
}

/// GET /comment/:id - one comment; a miss is a 200 with a null body
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_doc_id(&id)?;
    let doc = state.store.collection(names::COMMENTS)?.find_one_by_id(id).await?;
    Ok(Json(doc.unwrap_or(Value::Null)))
}
