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
pub struct CreateCommentRequest {
    /// Comment text (1-500 characters)
    #[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
    pub content: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with its comments, newest first", body = NodeWithChildren),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Extension(state): Extension<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = HierarchyService::from_state(&state);
    let post = service.get_node(id, NodeKind::Post).await?;
    let comments = service
        .list_children(post.id, ListOrder::default_for(NodeKind::Post))
        .await?;

    Ok(ApiResponse::ok(NodeWithChildren::new(post, comments)))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/comments",
    security(("session_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = NodeResponse),
        (status = 303, description = "Not logged in, redirect to login"),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Post not found or not commentable", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_comment(
    Extension(state): Extension<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    authorize(Action::CreateComment, &actor, None)?;
    let payload = validated(payload)?;

    let service = HierarchyService::from_state(&state);
    let comment = service
        .create_reply_in(&actor, NodeKind::Post, id, &payload.content)
        .await?;

    Ok(ApiResponse::ok(NodeResponse::from(comment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    security(("session_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = String),
        (status = 303, description = "Not logged in, redirect to login"),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
        (status = 409, description = "Post has replies or opens a topic", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(state): Extension<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = HierarchyService::from_state(&state);
    service.delete_content(&actor, NodeKind::Post, id).await?;
    Ok(ApiResponse::ok("Post deleted"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    security(("session_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = String),
        (status = 303, description = "Not logged in, redirect to login"),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_comment(
    Extension(state): Extension<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = HierarchyService::from_state(&state);
    service.delete_content(&actor, NodeKind::Comment, id).await?;
    Ok(ApiResponse::ok("Comment deleted"))
}
