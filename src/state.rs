use crate::store::StoreClient;

/// Shared router state: the process-scoped store client, constructed once
/// at startup and injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreClient,
}
