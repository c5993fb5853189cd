use uuid::Uuid;

use crate::error::ApiError;

pub mod protected;
pub mod public;

/// Path ids address store documents; anything that is not a document id is
/// rejected before touching the store.
pub(crate) fn parse_doc_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request("invalid document id"))
}
