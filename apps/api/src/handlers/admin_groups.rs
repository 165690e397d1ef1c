use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::HeaderName;
use axum::http::header::CONTENT_RANGE;

use admiral_domain::RequesterContext;

use crate::dto::{AdminGroupListResponse, AssignableGroupsResponse, ListAdminGroupsQuery};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_admin_groups_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<RequesterContext>,
    Query(query): Query<ListAdminGroupsQuery>,
) -> ApiResult<([(HeaderName, String); 1], Json<AdminGroupListResponse>)> {
    let request = query.page_request()?;
    let page = state.group_service.list_groups(&requester, &request).await?;
    let content_range = page.range.content_range("groups");

    Ok((
        [(CONTENT_RANGE, content_range)],
        Json(AdminGroupListResponse::from(page)),
    ))
}

pub async fn assignable_groups_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<RequesterContext>,
) -> ApiResult<Json<AssignableGroupsResponse>> {
    let assignable = state
        .group_service
        .list_assignable_groups(&requester)
        .await?;

    Ok(Json(AssignableGroupsResponse::from(assignable)))
}
