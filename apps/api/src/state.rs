use admiral_application::{AdminAccountService, AdminGroupService};
use admiral_domain::RoleResolver;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AdminAccountService,
    pub group_service: AdminGroupService,
    pub role_resolver: RoleResolver,
}
