use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::ApiResult;
use crate::handlers::parse_doc_id;
use crate::middleware::{require_owner, AuthIdentity};
use crate::state::AppState;
use crate::store::{names, DeleteResult, DocFilter, FindOptions, InsertResult};

#[derive(Debug, Deserialize)]
pub struct NewWishlistEntry {
    /// Owning user email
    pub user: String,
    /// Denormalized post snapshot as sent by the client
    #[serde(flatten)]
    pub entry: Map<String, Value>,
}

/// The stored document: the snapshot plus the owner, minus any
/// client-supplied `_id` - the entry gets its own identity, so saving the
/// same post twice produces two distinct records.
fn entry_doc(payload: NewWishlistEntry) -> Map<String, Value> {
    let mut doc = payload.entry;
    doc.remove("_id");
    doc.insert("user".to_string(), json!(payload.user));
    doc
}

/// GET /get-wish-list/:email - the caller's wishlist, newest first
pub async fn list_for(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(email): Path<String>,
) -> ApiResult<Json<Value>> {
    require_owner(&identity, &email)?;

    let docs = state
        .store
        .collection(names::WISHLISTS)?
        .find(DocFilter::new().eq("user", email), FindOptions::newest_first())
        .await?;
    Ok(Json(Value::Array(docs)))
}

/// POST /add-to-wishlist
pub async fn add(
    State(state): State<AppState>,
    Json(payload): Json<NewWishlistEntry>,
) -> ApiResult<Json<InsertResult>> {
    let result = state
        .store
        .collection(names::WISHLISTS)?
        .insert_one(entry_doc(payload))
        .await?;
    Ok(Json(result))
}

/// DELETE /delete-to-wishlist/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    let id = parse_doc_id(&id)?;
    let result = state
        .store
        .collection(names::WISHLISTS)?
        .delete_one(DocFilter::new().id(id))
        .await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_supplied_id_is_stripped_before_insert() {
        let payload: NewWishlistEntry = serde_json::from_value(json!({
            "user": "reader@example.com",
            "_id": "652f8a1f9d2c4b0007e1a111",
            "postId": "652f8a1f9d2c4b0007e1a222",
            "title": "Hills",
        }))
        .unwrap();

        let doc = entry_doc(payload);
        assert!(!doc.contains_key("_id"));
        assert_eq!(doc["user"], json!("reader@example.com"));
        assert_eq!(doc["postId"], json!("652f8a1f9d2c4b0007e1a222"));
    }
}
