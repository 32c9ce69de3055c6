use crate::handlers;
use crate::middleware::identity_middleware;
use axum::{middleware, routing, Router};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

/// Every route sees the caller's identity; what an anonymous caller may do is
/// decided per operation, not per router.
fn api_routes() -> Router {
    auth_routes()
        .merge(hierarchy_routes())
        .merge(admin_routes())
        .layer(middleware::from_fn(identity_middleware))
}

fn auth_routes() -> Router {
    Router::new()
        .route("/auth/register", routing::post(handlers::auth::register))
        .route("/auth/login", routing::post(handlers::auth::login))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        .route("/auth/me", routing::get(handlers::auth::get_current_user))
}

fn hierarchy_routes() -> Router {
    Router::new()
        // Categories
        .route(
            "/categories",
            routing::get(handlers::category::list_categories)
                .post(handlers::category::create_category),
        )
        .route(
            "/categories/{id}",
            routing::get(handlers::category::get_category),
        )
        .route(
            "/categories/{id}/children",
            routing::post(handlers::category::create_child),
        )
        // Forums
        .route("/forums/{id}", routing::get(handlers::forum::get_forum))
        .route(
            "/forums/{id}/topics",
            routing::post(handlers::forum::create_topic),
        )
        // Topics
        .route("/topics/{id}", routing::get(handlers::topic::get_topic))
        .route(
            "/topics/{id}/posts",
            routing::post(handlers::topic::reply_to_topic),
        )
        // Posts and comments
        .route(
            "/posts/{id}",
            routing::get(handlers::post::get_post).delete(handlers::post::delete_post),
        )
        .route(
            "/posts/{id}/comments",
            routing::post(handlers::post::create_comment),
        )
        .route(
            "/comments/{id}",
            routing::delete(handlers::post::delete_comment),
        )
}

fn admin_routes() -> Router {
    Router::new().route("/admin", routing::get(handlers::admin::admin_panel))
}
