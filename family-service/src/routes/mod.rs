use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{
    catalog_handlers::{list_games, list_recipes},
    comment_handlers::{create_comment, list_comments},
    event_handlers::{create_event, delete_event, get_event, list_events, update_event},
    family_handlers::{accept_invitation, create_family, get_family, invite_member, list_families},
    rsvp_handlers::{list_rsvps, upsert_rsvp},
};
use gather_shared::store::{dynamo::DynamoStore, GatherStore};

// Import shared auth middleware
use gather_shared::auth::auth_middleware;

/// Creates a router with the default store
pub async fn create_router() -> Router {
    info!("Creating router with DynamoDB store");

    // Create the DynamoDB store
    let dynamo_store = Arc::new(DynamoStore::new().await);

    // Check if we should remove the base path prefix
    let remove_base_path = std::env::var("REMOVE_BASE_PATH")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    // If REMOVE_BASE_PATH is set to true, don't add the /Prod prefix
    let prefix = if remove_base_path { "" } else { "/Prod" };
    info!("Using API route prefix: {}", prefix);

    create_router_with_store(dynamo_store, prefix)
}

/// Creates a router with a given store implementation
pub fn create_router_with_store<S>(store: Arc<S>, prefix: &str) -> Router
where
    S: GatherStore + 'static,
{
    info!("Setting up API routes with prefix: '{}'", prefix);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Logging middleware to trace all requests
    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    let api_routes = Router::new()
        .route("/families", post(create_family).get(list_families))
        .route("/families/:family_id", get(get_family))
        .route("/families/:family_id/invite", post(invite_member))
        .route("/invite/accept", post(accept_invitation))
        .route("/events", post(create_event).get(list_events))
        .route(
            "/events/:event_id",
            get(get_event).put(update_event).delete(delete_event),
        )
        // POST variant kept for clients that cannot issue DELETE
        .route("/events/:event_id/delete", post(delete_event))
        .route("/events/:event_id/rsvp", post(upsert_rsvp).get(list_rsvps))
        .route(
            "/events/:event_id/comments",
            post(create_comment).get(list_comments),
        )
        .route("/recipes", get(list_recipes))
        .route("/games", get(list_games))
        .layer(middleware::from_fn(auth_middleware))
        .with_state(store);

    // Create the main router
    let router = if prefix.is_empty() {
        // For tests or when no prefix is needed, don't nest the routes
        api_routes
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    } else {
        // For production, nest the routes under the prefix
        Router::new()
            .nest(prefix, api_routes)
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    };

    info!(
        "Router configured with all routes and middleware under prefix: '{}'",
        prefix
    );

    // Add a fallback handler for 404s
    router.fallback(|req: Request| async move {
        warn!("No route matched for: {} {}", req.method(), req.uri());
        (
            axum::http::StatusCode::NOT_FOUND,
            "The requested resource was not found".to_string(),
        )
    })
}
