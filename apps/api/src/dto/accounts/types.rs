use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Query string of the admin listing.
///
/// `filter` is a JSON object; see [`ListAdminsQuery::listing_filter`].
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/list-admins-query.ts"
)]
pub struct ListAdminsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub filter: Option<String>,
    pub continuation_token: Option<String>,
}

/// API representation of an admin account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admin-account-response.ts"
)]
pub struct AdminAccountResponse {
    pub id: String,
    pub username: String,
    pub enabled: bool,
    pub status: String,
    pub sub: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub phone_number: Option<String>,
    pub phone_number_verified: bool,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub name: Option<String>,
    pub middle_name: Option<String>,
    pub nickname: Option<String>,
    pub locale: Option<String>,
    pub picture: Option<String>,
    pub profile: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    #[serde(rename = "alter-email")]
    pub alter_email: Option<String>,
    #[serde(rename = "voice-number")]
    pub voice_number: Option<String>,
    pub groups: Vec<String>,
    pub created_at: Option<String>,
    pub last_modified_at: Option<String>,
}

/// Neighbouring page availability.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/page-info-response.ts"
)]
pub struct PageInfoResponse {
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

/// One page of the admin listing.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admin-list-response.ts"
)]
pub struct AdminListResponse {
    pub data: Vec<AdminAccountResponse>,
    pub page_info: PageInfoResponse,
    pub continuation_token: Option<String>,
}

/// Profile attributes accepted on create and update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admin-attributes-request.ts"
)]
pub struct AdminAttributesRequest {
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default, rename = "alter-email")]
    pub alter_email: Option<String>,
    #[serde(default, rename = "voice-number")]
    pub voice_number: Option<String>,
}

/// Incoming payload for admin creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-admin-request.ts"
)]
pub struct CreateAdminRequest {
    pub email: String,
    #[serde(flatten)]
    pub attributes: AdminAttributesRequest,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub notify: bool,
}

/// Identifier of a deleted admin.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/deleted-admin-response.ts"
)]
pub struct DeletedAdminResponse {
    pub id: String,
}

/// Groups the requester may assign to a new admin.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assignable-groups-response.ts"
)]
pub struct AssignableGroupsResponse {
    pub groups: Vec<String>,
    pub reason: Option<String>,
}
