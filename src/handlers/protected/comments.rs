use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_doc_id;
use crate::state::AppState;
use crate::store::{names, DocFilter, InsertResult, UpdateResult};

#[derive(Debug, Deserialize, Serialize)]
pub struct NewComment {
    #[serde(rename = "postId")]
    pub post_id: String,
    pub comment: String,
    /// Commenter email as displayed alongside the comment
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct CommentPatch {
    pub comment: String,
}

/// POST /add-comment
pub async fn add(
    State(state): State<AppState>,
    Json(payload): Json<NewComment>,
) -> ApiResult<Json<InsertResult>> {
    let doc = match serde_json::to_value(&payload) {
        Ok(Value::Object(map)) => map,
        _ => return Err(ApiError::bad_request("invalid comment document")),
    };

    let result = state.store.collection(names::COMMENTS)?.insert_one(doc).await?;
    Ok(Json(result))
}

/// PUT /edit-comment/:id - replace the comment text; plain update, never
/// inserts
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CommentPatch>,
) -> ApiResult<Json<UpdateResult>> {
    let id = parse_doc_id(&id)?;

    let mut set = Map::new();
    set.insert("comment".to_string(), json!(payload.comment));

    let result = state
        .store
        .collection(names::COMMENTS)?
        .update_one(DocFilter::new().id(id), set, false)
        .await?;
    Ok(Json(result))
}
