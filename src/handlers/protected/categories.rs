use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_doc_id;
use crate::state::AppState;
use crate::store::{names, DeleteResult, DocFilter, InsertResult, UpdateResult};

#[derive(Debug, Deserialize, Serialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryPatch {
    pub name: String,
}

/// POST /add-category
pub async fn add(
    State(state): State<AppState>,
    Json(payload): Json<NewCategory>,
) -> ApiResult<Json<InsertResult>> {
    let doc = match serde_json::to_value(&payload) {
        Ok(Value::Object(map)) => map,
        _ => return Err(ApiError::bad_request("invalid category document")),
    };

    let result = state.store.collection(names::CATEGORIES)?.insert_one(doc).await?;
    Ok(Json(result))
}

/// PUT /edit-category/:id - rename; plain update, never inserts
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryPatch>,
) -> ApiResult<Json<UpdateResult>> {
    let id = parse_doc_id(&id)?;

    let mut set = Map::new();
    set.insert("name".to_string(), json!(payload.name));

    let result = state
        .store
        .collection(names::CATEGORIES)?
        .update_one(DocFilter::new().id(id), set, false)
        .await?;
    Ok(Json(result))
}

/// DELETE /delete-category/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    let id = parse_doc_id(&id)?;
    let result = state
        .store
        .collection(names::CATEGORIES)?
        .delete_one(DocFilter::new().id(id))
        .await?;
    Ok(Json(result))
}
