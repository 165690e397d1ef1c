use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::header::CONTENT_RANGE;
use axum::http::{HeaderName, StatusCode};
use tracing::info;

use admiral_core::VerifiedClaims;
use admiral_domain::RequesterContext;

use crate::dto::{
    AdminAccountResponse, AdminAttributesRequest, AdminListResponse, CreateAdminRequest,
    DataEnvelope, DeletedAdminResponse, ListAdminsQuery,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_admins_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<RequesterContext>,
    Query(query): Query<ListAdminsQuery>,
) -> ApiResult<([(HeaderName, String); 1], Json<AdminListResponse>)> {
    let request = query.page_request()?;
    let filter = query.listing_filter()?;

    let page = state
        .account_service
        .list_accounts(&requester, &request, filter)
        .await?;
    let content_range = page.range.content_range("users");

    Ok((
        [(CONTENT_RANGE, content_range)],
        Json(AdminListResponse::from(page)),
    ))
}

pub async fn create_admin_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<RequesterContext>,
    Json(payload): Json<DataEnvelope<CreateAdminRequest>>,
) -> ApiResult<(StatusCode, Json<DataEnvelope<AdminAccountResponse>>)> {
    let input = payload.data.into_new_account()?;
    let account = state
        .account_service
        .create_account(&requester, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataEnvelope::new(AdminAccountResponse::from(account))),
    ))
}

pub async fn get_admin_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<RequesterContext>,
    Path(account_id): Path<String>,
) -> ApiResult<Json<DataEnvelope<AdminAccountResponse>>> {
    let account = state
        .account_service
        .get_account(&requester, account_id.as_str())
        .await?;

    Ok(Json(DataEnvelope::new(AdminAccountResponse::from(account))))
}

pub async fn update_admin_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<RequesterContext>,
    Path(account_id): Path<String>,
    Json(payload): Json<DataEnvelope<AdminAttributesRequest>>,
) -> ApiResult<Json<DataEnvelope<AdminAccountResponse>>> {
    let account = state
        .account_service
        .update_account(&requester, account_id.as_str(), payload.data.into())
        .await?;

    Ok(Json(DataEnvelope::new(AdminAccountResponse::from(account))))
}

pub async fn delete_admin_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<RequesterContext>,
    Extension(claims): Extension<VerifiedClaims>,
    Path(account_id): Path<String>,
) -> ApiResult<Json<DataEnvelope<DeletedAdminResponse>>> {
    let id = state
        .account_service
        .delete_account(&requester, account_id.as_str())
        .await?;

    info!(
        account_id = %id,
        requester_email = claims.email().unwrap_or("unknown"),
        "admin account deleted by requester"
    );
    Ok(Json(DataEnvelope::new(DeletedAdminResponse { id })))
}
