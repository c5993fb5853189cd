use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use kotha_api::config;
use kotha_api::handlers::{protected, public};
use kotha_api::middleware::access_guard;
use kotha_api::state::AppState;
use kotha_api::store::StoreClient;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, ACCESS_TOKEN_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Kotha API in {:?} mode", config.environment);

    // The pool is lazy, so this only fails on an unparseable DATABASE_URL
    let store = StoreClient::connect().unwrap_or_else(|e| panic!("store client: {}", e));

    // Best effort: the server still boots while the store is coming up
    if let Err(e) = store.init_schema().await {
        tracing::warn!("store schema init deferred: {}", e);
    }

    let app = app(AppState { store });

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Kotha API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Liveness
        .route("/", get(root))
        .route("/health", get(health))
        // Open surface
        .merge(open_routes())
        // Guarded surface
        .merge(guarded_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes that run without the access guard.
fn open_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(public::categories::list))
        .route("/category/:id", get(public::categories::get))
        .route("/blog-by-category/:name", get(public::posts::blog_by_category))
        .route("/all-post", get(public::posts::all_post))
        .route("/featured-post-home", get(public::posts::featured_home))
        .route("/post/:id", get(public::posts::get))
        .route("/comments", get(public::comments::list))
        .route("/comment/:id", get(public::comments::get))
        .route("/dashboard-count", get(public::dashboard::count))
        .route("/add-user", post(public::users::add))
        .route("/edit-user", put(public::users::edit))
        .route("/jwt", post(public::session::jwt))
        .route("/logout", post(public::session::logout))
}

/// Routes behind the access guard. Guarding is a property of this group;
/// adding a route here is what makes it require authentication.
fn guarded_routes() -> Router<AppState> {
    Router::new()
        .route("/all-blogs", get(protected::posts::all_blogs))
        .route("/featured-post/:email", get(protected::posts::featured_for))
        .route("/add-post", post(protected::posts::add))
        .route("/edit-post/:id", put(protected::posts::edit))
        .route("/delete-post/:id", delete(protected::posts::delete))
        .route("/add-category", post(protected::categories::add))
        .route("/edit-category/:id", put(protected::categories::edit))
        .route("/delete-category/:id", delete(protected::categories::delete))
        .route("/add-comment", post(protected::comments::add))
        .route("/edit-comment/:id", put(protected::comments::edit))
        .route("/get-wish-list/:email", get(protected::wishlist::list_for))
        .route("/add-to-wishlist", post(protected::wishlist::add))
        .route("/delete-to-wishlist/:id", delete(protected::wishlist::delete))
        .route_layer(axum::middleware::from_fn(access_guard))
}

/// Cross-origin policy: the web client is served from another origin and
/// sends the session cookie, so origins are enumerated and credentials
/// allowed - a wildcard would make browsers drop the cookie.
fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> &'static str {
    "Kotha Server is running"
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}
