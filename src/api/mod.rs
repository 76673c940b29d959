pub mod admin;
pub mod auth;
pub mod conversations;
pub mod listings;

use axum::Router;
use std::sync::Arc;

pub use auth::AppState;

pub fn routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .nest("/listings", listings::routes(state.clone()))
        .nest("/conversations", conversations::routes(state.clone()))
        .nest("/admin", admin::routes(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    Router::new()
        .nest("/auth", auth::routes(state.clone()))
        .merge(protected_routes)
}
