mod conversions;
mod types;

pub use types::{AdminGroupListResponse, AdminGroupResponse, ListAdminGroupsQuery};
