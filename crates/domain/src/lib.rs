//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access_policy;
mod account;
mod group;
mod group_catalog;
mod listing;
mod requester;
mod role;

pub use access_policy::{
    AccessDecision, AccessPolicyEngine, AccessTarget, AdminOperation, Denial, DenialKind,
    DenialVerbosity,
};
pub use account::{
    AccountAttributesInput, AccountProfile, AdminAccount, EmailAddress, NewAccountRecord,
    NewAdminAccount,
};
pub use group::AdminGroup;
pub use group_catalog::GroupCatalog;
pub use listing::{
    AttributeFilter, ContinuationToken, DisplayRange, ListingPage, PageInfo, PageRequest,
    RangeOrigin,
};
pub use requester::{DEFAULT_ROLE_CLAIM, DominantRole, RequesterContext, RoleResolver};
pub use role::{
    Role, RoleTier, SUB_SUPER_ADMIN_GROUP, SUPER_ADMIN_GROUP, TENANT_ADMIN_PREFIX,
    is_administrative_group,
};
