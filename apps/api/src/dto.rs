mod accounts;
mod common;
mod groups;

pub use accounts::{
    AdminAccountResponse, AdminAttributesRequest, AdminListResponse, AssignableGroupsResponse,
    CreateAdminRequest, DeletedAdminResponse, ListAdminsQuery, PageInfoResponse,
};
pub use common::{DataEnvelope, HealthResponse};
pub use groups::{AdminGroupListResponse, AdminGroupResponse, ListAdminGroupsQuery};
