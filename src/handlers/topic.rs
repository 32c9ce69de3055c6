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
pub struct ReplyRequest {
    #[validate(length(min = 1), custom(function = "not_blank"))]
    pub content: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/topics/{id}",
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic with its posts, oldest first", body = NodeWithChildren),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn get_topic(
    Extension(state): Extension<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = HierarchyService::from_state(&state);
    let topic = service.get_node(id, NodeKind::Topic).await?;
    let posts = service
        .list_children(topic.id, ListOrder::default_for(NodeKind::Topic))
        .await?;

    Ok(ApiResponse::ok(NodeWithChildren::new(topic, posts)))
}

#[utoipa::path(
    post,
    path = "/api/v1/topics/{id}/posts",
    security(("session_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    request_body = ReplyRequest,
    responses(
        (status = 200, description = "Reply posted", body = NodeResponse),
        (status = 303, description = "Not logged in, redirect to login"),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn reply_to_topic(
    Extension(state): Extension<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
    payload: Result<Json<ReplyRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    authorize(Action::CreateComment, &actor, None)?;
    let payload = validated(payload)?;

    let service = HierarchyService::from_state(&state);
    let post = service
        .create_reply_in(&actor, NodeKind::Topic, id, &payload.content)
        .await?;

    Ok(ApiResponse::ok(NodeResponse::from(post)))
}
