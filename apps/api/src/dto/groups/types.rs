use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Query string of the admin group listing.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/list-admin-groups-query.ts"
)]
pub struct ListAdminGroupsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub continuation_token: Option<String>,
}

/// API representation of an admin group.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admin-group-response.ts"
)]
pub struct AdminGroupResponse {
    pub id: String,
    pub group: String,
    pub creation_date: String,
    pub description: Option<String>,
    pub last_modified_date: String,
    pub precedence: Option<i32>,
}

/// One page of the admin group listing.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admin-group-list-response.ts"
)]
pub struct AdminGroupListResponse {
    pub data: Vec<AdminGroupResponse>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}
