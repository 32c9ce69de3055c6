use super::payload::{not_blank, validated};
use super::{NodeResponse, NodeWithChildren};
use crate::access::{authorize, Action, Actor};
use crate::error::{AppError, AppResult};
use crate::models::NodeKind;
use crate::response::ApiResponse;
use crate::services::hierarchy::{HierarchyService, ListOrder};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    /// Category name (1-100 characters)
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: String,
    /// Short description (max 200 characters)
    #[validate(length(max = 200))]
    #[serde(default)]
    pub description: String,
}

/// Body for whatever sits directly under a category: a forum, or a post in the
/// flat layout.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateChildRequest {
    /// Title (1-150 characters)
    #[validate(length(min = 1, max = 150), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1), custom(function = "not_blank"))]
    pub content: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "All categories, oldest first", body = Vec<NodeResponse>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    let service = HierarchyService::from_state(&state);
    let categories = service.list_categories().await?;

    let items: Vec<NodeResponse> = categories.into_iter().map(NodeResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    security(("session_token" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = NodeResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "categories"
)]
pub async fn create_category(
    Extension(state): Extension<AppState>,
    actor: Actor,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    authorize(Action::CreateCategory, &actor, None)?;
    let payload = validated(payload)?;

    let service = HierarchyService::from_state(&state);
    let category = service
        .create_category(&actor, &payload.name, &payload.description)
        .await?;

    Ok(ApiResponse::ok(NodeResponse::from(category)))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category with its forums or posts, newest first", body = NodeWithChildren),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "categories"
)]
pub async fn get_category(
    Extension(state): Extension<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = HierarchyService::from_state(&state);
    let category = service.get_node(id, NodeKind::Category).await?;
    let children = service
        .list_children(category.id, ListOrder::default_for(NodeKind::Category))
        .await?;

    Ok(ApiResponse::ok(NodeWithChildren::new(category, children)))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories/{id}/children",
    security(("session_token" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CreateChildRequest,
    responses(
        (status = 200, description = "Forum (nested layout) or post (flat layout) created", body = NodeResponse),
        (status = 303, description = "Not logged in, redirect to login"),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Creating forums is admin only", body = AppError),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "categories"
)]
pub async fn create_child(
    Extension(state): Extension<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
    payload: Result<Json<CreateChildRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let service = HierarchyService::from_state(&state);
    let (action, _) = service.category_child();
    authorize(action, &actor, None)?;
    let payload = validated(payload)?;

    let node = service
        .create_forum_or_post(&actor, id, &payload.title, &payload.content)
        .await?;

    Ok(ApiResponse::ok(NodeResponse::from(node)))
}
