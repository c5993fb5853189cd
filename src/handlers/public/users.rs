use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::{names, DocFilter, InsertResult, UpdateResult};

#[derive(Debug, Deserialize, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile fields settable through /edit-user. Exactly these five are
/// written; an upsert miss creates a user carrying exactly them.
#[derive(Debug, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: String,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
}

fn profile_fields(profile: &UserProfile) -> Map<String, Value> {
    let mut set = Map::new();
    set.insert("name".to_string(), json!(profile.name));
    set.insert("email".to_string(), json!(profile.email));
    set.insert("photo".to_string(), json!(profile.photo));
    set.insert("bio".to_string(), json!(profile.bio));
    set.insert("address".to_string(), json!(profile.address));
    set
}

/// POST /add-user - register a user document
pub async fn add(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<Json<InsertResult>> {
    let doc = match serde_json::to_value(&payload) {
        Ok(Value::Object(map)) => map,
        _ => return Err(ApiError::bad_request("invalid user document")),
    };

    let result = state.store.collection(names::USERS)?.insert_one(doc).await?;
    Ok(Json(result))
}

/// PUT /edit-user - set the profile fields on the user keyed by the body
/// email, creating the record when it does not exist yet
pub async fn edit(
    State(state): State<AppState>,
    Json(payload): Json<UserProfile>,
) -> ApiResult<Json<UpdateResult>> {
    let filter = DocFilter::new().eq("email", payload.email.clone());
    let result = state
        .store
        .collection(names::USERS)?
        .update_one(filter, profile_fields(&payload), true)
        .await?;
    Ok(Json(result))
}
