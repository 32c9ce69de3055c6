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
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTopicRequest {
    /// Topic title (1-150 characters)
    #[validate(length(min = 1, max = 150), custom(function = "not_blank"))]
    pub title: String,
    /// Content of the opening post
    #[validate(length(min = 1), custom(function = "not_blank"))]
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopicResponse {
    pub topic: NodeResponse,
    pub first_post: NodeResponse,
}

#[utoipa::path(
    get,
    path = "/api/v1/forums/{id}",
    params(("id" = i32, Path, description = "Forum ID")),
    responses(
        (status = 200, description = "Forum with its topics, newest first", body = NodeWithChildren),
        (status = 404, description = "Forum not found", body = AppError),
    ),
    tag = "forums"
)]
pub async fn get_forum(
    Extension(state): Extension<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = HierarchyService::from_state(&state);
    let forum = service.get_node(id, NodeKind::Forum).await?;
    let topics = service
        .list_children(forum.id, ListOrder::default_for(NodeKind::Forum))
        .await?;

    Ok(ApiResponse::ok(NodeWithChildren::new(forum, topics)))
}

#[utoipa::path(
    post,
    path = "/api/v1/forums/{id}/topics",
    security(("session_token" = [])),
    params(("id" = i32, Path, description = "Forum ID")),
    request_body = CreateTopicRequest,
    responses(
        (status = 200, description = "Topic and opening post created", body = TopicResponse),
        (status = 303, description = "Not logged in, redirect to login"),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Forum not found", body = AppError),
    ),
    tag = "forums"
)]
pub async fn create_topic(
    Extension(state): Extension<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
    payload: Result<Json<CreateTopicRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    authorize(Action::CreateTopic, &actor, None)?;
    let payload = validated(payload)?;

    let service = HierarchyService::from_state(&state);
    let created = service
        .create_topic(&actor, id, &payload.title, &payload.content)
        .await?;

    Ok(ApiResponse::ok(TopicResponse {
        topic: created.topic.into(),
        first_post: created.first_post.into(),
    }))
}
