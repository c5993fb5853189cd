use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_doc_id;
use crate::handlers::public::posts::FEATURED_RANK_FIELD;
use crate::middleware::{require_owner, AuthIdentity};
use crate::state::AppState;
use crate::store::{names, DeleteResult, DocFilter, FindOptions, InsertResult, UpdateResult};

#[derive(Debug, Deserialize)]
pub struct BlogQuery {
    /// Declared owner; must match the caller when present
    pub email: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// GET /all-blogs?email&category&search - the caller's posts, optionally
/// narrowed by category and full-text search (all conditions intersect)
pub async fn all_blogs(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Query(query): Query<BlogQuery>,
) -> ApiResult<Json<Value>> {
    let mut filter = DocFilter::new();
    if let Some(email) = &query.email {
        require_owner(&identity, email)?;
        filter = filter.eq("createdBy", email.clone());
    }
    if let Some(category) = query.category {
        filter = filter.eq("category", category);
    }
    if let Some(search) = query.search {
        filter = filter.text(search);
    }

    let docs = state
        .store
        .collection(names::POSTS)?
        .find(filter, FindOptions::newest_first())
        .await?;
    Ok(Json(Value::Array(docs)))
}

/// GET /featured-post/:email - the caller's posts ranked by description
/// length, longest first
pub async fn featured_for(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(email): Path<String>,
) -> ApiResult<Json<Value>> {
    require_owner(&identity, &email)?;

    let docs = state
        .store
        .collection(names::POSTS)?
        .rank_by_text_length(DocFilter::new().eq("createdBy", email), FEATURED_RANK_FIELD)
        .await?;
    Ok(Json(Value::Array(docs)))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// POST /add-post - store a new post document
pub async fn add(
    State(state): State<AppState>,
    Json(payload): Json<NewPost>,
) -> ApiResult<Json<InsertResult>> {
    let doc = match serde_json::to_value(&payload) {
        Ok(Value::Object(map)) => map,
        _ => return Err(ApiError::bad_request("invalid post document")),
    };

    let result = state.store.collection(names::POSTS)?.insert_one(doc).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct EditPost {
    /// Declared owner, checked against the caller; ownership never
    /// transfers, so it is not part of the patch
    pub email: String,
    #[serde(flatten)]
    pub changes: Map<String, Value>,
}

/// PUT /edit-post/:id - set the supplied fields on the caller's post
pub async fn edit(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<EditPost>,
) -> ApiResult<Json<UpdateResult>> {
    let id = parse_doc_id(&id)?;
    require_owner(&identity, &payload.email)?;

    let result = state
        .store
        .collection(names::POSTS)?
        .update_one(DocFilter::new().id(id), payload.changes, true)
        .await?;
    Ok(Json(result))
}

/// DELETE /delete-post/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    let id = parse_doc_id(&id)?;
    let result = state
        .store
        .collection(names::POSTS)?
        .delete_one(DocFilter::new().id(id))
        .await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edit_body_separates_owner_declaration_from_patch() {
        let payload: EditPost = serde_json::from_value(json!({
            "email": "writer@example.com",
            "title": "Updated title",
            "category": "travel",
        }))
        .unwrap();

        assert_eq!(payload.email, "writer@example.com");
        assert!(!payload.changes.contains_key("email"));
        assert_eq!(payload.changes["title"], json!("Updated title"));
        assert_eq!(payload.changes["category"], json!("travel"));
    }

    #[test]
    fn new_post_document_keeps_unmodeled_fields() {
        let payload: NewPost = serde_json::from_value(json!({
            "title": "Hills",
            "description": "A long walk",
            "createdBy": "writer@example.com",
            "coverImage": "https://img.example.com/hills.jpg",
        }))
        .unwrap();

        let doc = serde_json::to_value(&payload).unwrap();
        assert_eq!(doc["createdBy"], json!("writer@example.com"));
        assert_eq!(doc["coverImage"], json!("https://img.example.com/hills.jpg"));
        assert!(doc.get("category").is_none());
    }
}
