use super::NodeResponse;
use crate::access::{authorize, Action, Actor};
use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::services::admin::AdminService;
use crate::services::hierarchy::HierarchyService;
use crate::state::AppState;
use axum::{response::IntoResponse, Extension};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_categories: u64,
    pub total_forums: u64,
    pub total_topics: u64,
    pub total_posts: u64,
    pub total_comments: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminPanelResponse {
    pub categories: Vec<NodeResponse>,
    pub stats: StatsResponse,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Admin panel: categories and statistics", body = AdminPanelResponse),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn admin_panel(
    Extension(state): Extension<AppState>,
    actor: Actor,
) -> AppResult<impl IntoResponse> {
    // Anonymous callers get 403 here too, not the login redirect.
    authorize(Action::AccessAdminPanel, &actor, None)?;

    let categories = HierarchyService::from_state(&state)
        .list_categories()
        .await?;
    let stats = AdminService::new(state.db.clone()).get_stats().await?;

    Ok(ApiResponse::ok(AdminPanelResponse {
        categories: categories.into_iter().map(NodeResponse::from).collect(),
        stats: StatsResponse {
            total_users: stats.total_users,
            total_categories: stats.total_categories,
            total_forums: stats.total_forums,
            total_topics: stats.total_topics,
            total_posts: stats.total_posts,
            total_comments: stats.total_comments,
        },
    }))
}
