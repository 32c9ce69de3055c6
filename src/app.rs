use crate::middleware::{security_headers_middleware, SecurityHeaders};
use crate::routes;
use crate::state::AppState;
use axum::{
    extract::Extension, middleware, response::IntoResponse, routing::get, Json, Router,
};
use sea_orm::{ConnectionTrait, Statement};
use serde_json::json;
use std::env;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::get_current_user,
        // Category routes
        crate::handlers::category::list_categories,
        crate::handlers::category::create_category,
        crate::handlers::category::get_category,
        crate::handlers::category::create_child,
        // Forum routes
        crate::handlers::forum::get_forum,
        crate::handlers::forum::create_topic,
        // Topic routes
        crate::handlers::topic::get_topic,
        crate::handlers::topic::reply_to_topic,
        // Post routes
        crate::handlers::post::get_post,
        crate::handlers::post::create_comment,
        crate::handlers::post::delete_post,
        crate::handlers::post::delete_comment,
        // Admin routes
        crate::handlers::admin::admin_panel,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::error::AppError,
            crate::models::NodeKind,
            crate::handlers::NodeResponse,
            crate::handlers::NodeWithChildren,
            // Auth
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AuthResponse,
            crate::handlers::auth::UserResponse,
            // Hierarchy
            crate::handlers::category::CreateCategoryRequest,
            crate::handlers::category::CreateChildRequest,
            crate::handlers::forum::CreateTopicRequest,
            crate::handlers::forum::TopicResponse,
            crate::handlers::topic::ReplyRequest,
            crate::handlers::post::CreateCommentRequest,
            // Admin
            crate::handlers::admin::StatsResponse,
            crate::handlers::admin::AdminPanelResponse,
        )
    ),
    modifiers(&SessionSecurity),
    tags(
        (name = "auth", description = "Registration, login and sessions"),
        (name = "categories", description = "Top level of the forum tree"),
        (name = "forums", description = "Forums and topic creation"),
        (name = "topics", description = "Topics and replies"),
        (name = "posts", description = "Posts, comments and deletion"),
        (name = "admin", description = "Administrative operations"),
    )
)]
pub struct ApiDoc;

struct SessionSecurity;

impl Modify for SessionSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::utils::SESSION_COOKIE,
                ))),
            );
        }
    }
}

/// Build the full application router with its state attached.
pub fn create_app(state: AppState, security: SecurityHeaders) -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            security,
            security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
        .layer(Extension(state))
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        // Cookies only travel cross-origin to an explicit allow list.
        cors.allow_origin(origins).allow_credentials(true)
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let backend = state.db.get_database_backend();
    let db_ok = state
        .db
        .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Agora Forum API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
        "layout": state.layout,
    }))
}
