mod conversions;
mod types;

pub use types::{
    AdminAccountResponse, AdminAttributesRequest, AdminListResponse, AssignableGroupsResponse,
    CreateAdminRequest, DeletedAdminResponse, ListAdminsQuery, PageInfoResponse,
};
