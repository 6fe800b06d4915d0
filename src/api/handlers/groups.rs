//! Group and notification API handlers

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::{
    extract::{Path, State},
    response::Response,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::{ApiResponse, EmptyData};
use crate::api::validated_json::ValidatedJson;
use crate::application::services::GroupOverview;
use crate::application::GroupService;
use crate::auth::AuthenticatedUser;
use crate::domain::{Group, RepositoryProvider};

use super::error_response;

/// State for group handlers
#[derive(Clone)]
pub struct GroupAppState {
    pub groups: Arc<GroupService>,
    pub repos: Arc<dyn RepositoryProvider>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Morning commute",
    "color": "#3b82f6"
}))]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub color: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupRequest {
    #[validate(length(max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 20))]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddMemberRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupDto {
    pub id: String,
    pub name: String,
    pub color: String,
    pub owner_id: String,
    pub members: Vec<MemberDto>,
}

/// Group list entry with the caller's new-ride flag
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupOverviewDto {
    pub id: String,
    pub name: String,
    pub color: String,
    pub has_new_ride: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationDto {
    pub id: String,
    pub group_id: String,
    pub ride_id: String,
}

impl GroupOverviewDto {
    fn from_overview(overview: GroupOverview) -> Self {
        Self {
            id: overview.group.id.to_string(),
            name: overview.group.name,
            color: overview.group.color,
            has_new_ride: overview.has_new_ride,
        }
    }
}

async fn to_dto(repos: &Arc<dyn RepositoryProvider>, group: Group) -> GroupDto {
    let mut members = Vec::with_capacity(group.member_ids.len());
    for member_id in &group.member_ids {
        let name = match repos.users().find_by_id(*member_id).await {
            Ok(Some(user)) => user.display_name(),
            _ => String::new(),
        };
        members.push(MemberDto {
            id: member_id.to_string(),
            name,
        });
    }
    GroupDto {
        id: group.id.to_string(),
        name: group.name,
        color: group.color,
        owner_id: group.owner_id.to_string(),
        members,
    }
}

/// Create a group; the caller becomes owner and first member
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    tag = "Groups",
    security(("bearer_auth" = [])),
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created", body = ApiResponse<GroupDto>)
    )
)]
pub async fn create_group(
    State(state): State<GroupAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> Response {
    match state
        .groups
        .create(user.context(), &request.name, &request.color)
        .await
    {
        Ok(group) => {
            Json(ApiResponse::success(to_dto(&state.repos, group).await)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// The caller's groups with new-ride flags
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "Groups",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Groups with flags", body = ApiResponse<Vec<GroupOverviewDto>>)
    )
)]
pub async fn list_groups(
    State(state): State<GroupAppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Response {
    match state.groups.list_with_flags(user.context()).await {
        Ok(overviews) => {
            let dtos: Vec<GroupOverviewDto> = overviews
                .into_iter()
                .map(GroupOverviewDto::from_overview)
                .collect();
            Json(ApiResponse::success(dtos)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// One group with member details
#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("group_id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "The group", body = ApiResponse<GroupDto>),
        (status = 404, description = "Group not found")
    )
)]
pub async fn get_group(
    State(state): State<GroupAppState>,
    Path(group_id): Path<Uuid>,
) -> Response {
    match state.groups.get(group_id).await {
        Ok(group) => {
            Json(ApiResponse::success(to_dto(&state.repos, group).await)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Rename or recolor a group
#[utoipa::path(
    put,
    path = "/api/v1/groups/{group_id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("group_id" = Uuid, Path, description = "Group ID")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = ApiResponse<GroupDto>),
        (status = 403, description = "Caller is not a member")
    )
)]
pub async fn update_group(
    State(state): State<GroupAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(group_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateGroupRequest>,
) -> Response {
    match state
        .groups
        .update(
            user.context(),
            group_id,
            request.name.as_deref(),
            request.color.as_deref(),
        )
        .await
    {
        Ok(group) => {
            Json(ApiResponse::success(to_dto(&state.repos, group).await)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Invite a member by email
#[utoipa::path(
    post,
    path = "/api/v1/groups/{group_id}/members",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("group_id" = Uuid, Path, description = "Group ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added", body = ApiResponse<GroupDto>),
        (status = 404, description = "Group or user not found")
    )
)]
pub async fn add_member(
    State(state): State<GroupAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(group_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> Response {
    match state
        .groups
        .add_member(user.context(), group_id, &request.email)
        .await
    {
        Ok(group) => {
            Json(ApiResponse::success(to_dto(&state.repos, group).await)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Remove a member (a member may remove themselves; the owner may remove
/// anyone else)
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{group_id}/members/{user_id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(
        ("group_id" = Uuid, Path, description = "Group ID"),
        ("user_id" = Uuid, Path, description = "Member to remove")
    ),
    responses(
        (status = 200, description = "Member removed", body = ApiResponse<GroupDto>),
        (status = 409, description = "Owner cannot leave their own group")
    )
)]
pub async fn remove_member(
    State(state): State<GroupAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
) -> Response {
    match state
        .groups
        .remove_member(user.context(), group_id, user_id)
        .await
    {
        Ok(group) => {
            Json(ApiResponse::success(to_dto(&state.repos, group).await)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Delete a group (owner only)
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{group_id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("group_id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Caller is not the owner")
    )
)]
pub async fn delete_group(
    State(state): State<GroupAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(group_id): Path<Uuid>,
) -> Response {
    match state.groups.delete(user.context(), group_id).await {
        Ok(()) => Json(ApiResponse::success(EmptyData {})).into_response(),
        Err(err) => error_response(err),
    }
}

/// The caller's unread new-ride notifications
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Groups",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread notifications", body = ApiResponse<Vec<NotificationDto>>)
    )
)]
pub async fn list_notifications(
    State(state): State<GroupAppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Response {
    match state.groups.unread_notifications(user.context()).await {
        Ok(notifications) => {
            let dtos: Vec<NotificationDto> = notifications
                .into_iter()
                .map(|n| NotificationDto {
                    id: n.id.to_string(),
                    group_id: n.group_id.to_string(),
                    ride_id: n.ride_id.to_string(),
                })
                .collect();
            Json(ApiResponse::success(dtos)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Clear the caller's new-ride flag for one group
#[utoipa::path(
    post,
    path = "/api/v1/groups/{group_id}/notifications/read",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("group_id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Notifications marked read", body = ApiResponse<EmptyData>)
    )
)]
pub async fn mark_notifications_read(
    State(state): State<GroupAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(group_id): Path<Uuid>,
) -> Response {
    match state
        .groups
        .mark_notifications_read(user.context(), group_id)
        .await
    {
        Ok(_) => Json(ApiResponse::success(EmptyData {})).into_response(),
        Err(err) => error_response(err),
    }
}
