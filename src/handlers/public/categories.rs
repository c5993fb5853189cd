use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::Value;

use crate::error::ApiResult;
use crate::handlers::parse_doc_id;
use crate::state::AppState;
use crate::store::{names, DocFilter, FindOptions};

/// GET /categories - every category
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let docs = state
        .store
        .collection(names::CATEGORIES)?
        .find(DocFilter::new(), FindOptions::default())
        .await?;
    Ok(Json(Value::Array(docs)))
}

/// GET /category/:id - one category; a miss is a 200 with a null body
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_doc_id(&id)?;
    let doc = state.store.collection(names::CATEGORIES)?.find_one_by_id(id).await?;
    Ok(Json(doc.unwrap_or(Value::Null)))
}
