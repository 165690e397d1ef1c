//! Application services and ports.

#![forbid(unsafe_code)]

mod admin_account_service;
mod admin_group_service;
mod directory_lister;
mod directory_ports;
mod pagination;

#[cfg(test)]
mod test_directory;

pub use admin_account_service::AdminAccountService;
pub use admin_group_service::{
    AdminGroupService, AssignableGroups, DEFAULT_GROUP_PAGE_SIZE, MAX_GROUP_DIRECTORY_PAGES,
};
pub use directory_lister::{
    AccountBatch, AccountListingQuery, AccumulationState, DEFAULT_MAX_CONSECUTIVE_EMPTY_PAGES,
    DEFAULT_MEMBERSHIP_FAN_OUT, DirectoryLister, ListingLimits,
};
pub use directory_ports::{DirectoryPage, DirectoryService};
pub use pagination::{
    AccountListingFilter, PaginationCoordinator, RangeConvention, RangeTotal,
};
