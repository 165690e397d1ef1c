use std::fmt::{Display, Formatter};
use std::str::FromStr;

use admiral_core::AppError;
use serde::{Deserialize, Serialize};

/// Group name of the super administrator tier.
pub const SUPER_ADMIN_GROUP: &str = "SA";

/// Group name of the sub super administrator tier.
pub const SUB_SUPER_ADMIN_GROUP: &str = "SPA";

/// Prefix shared by every tenant administrator group.
pub const TENANT_ADMIN_PREFIX: &str = "TA_";

/// Administrative role derived from a verified role claim.
///
/// Roles are only ever built from claim tokens matching the role grammar:
/// exactly `SA`, exactly `SPA`, or any token starting with `TA_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Unrestricted access to every account and group.
    SuperAdmin,
    /// Full access except to super administrator accounts and groups.
    SubSuperAdmin,
    /// Access scoped to one tenant's accounts and groups.
    TenantAdmin(String),
}

/// Authority tier of a role, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoleTier {
    /// Tenant scoped administrator.
    TenantAdmin,
    /// Second tier administrator.
    SubSuperAdmin,
    /// Top tier administrator.
    SuperAdmin,
}

impl Role {
    /// Parses one claim token, returning `None` when it is outside the role grammar.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            SUPER_ADMIN_GROUP => Some(Self::SuperAdmin),
            SUB_SUPER_ADMIN_GROUP => Some(Self::SubSuperAdmin),
            _ => token
                .strip_prefix(TENANT_ADMIN_PREFIX)
                .map(|tenant| Self::TenantAdmin(tenant.to_owned())),
        }
    }

    /// Returns the directory group name that carries this role.
    #[must_use]
    pub fn group_name(&self) -> String {
        match self {
            Self::SuperAdmin => SUPER_ADMIN_GROUP.to_owned(),
            Self::SubSuperAdmin => SUB_SUPER_ADMIN_GROUP.to_owned(),
            Self::TenantAdmin(tenant) => format!("{TENANT_ADMIN_PREFIX}{tenant}"),
        }
    }

    /// Returns the authority tier.
    #[must_use]
    pub fn tier(&self) -> RoleTier {
        match self {
            Self::SuperAdmin => RoleTier::SuperAdmin,
            Self::SubSuperAdmin => RoleTier::SubSuperAdmin,
            Self::TenantAdmin(_) => RoleTier::TenantAdmin,
        }
    }

    /// Returns the tenant of a tenant administrator role.
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        match self {
            Self::TenantAdmin(tenant) => Some(tenant.as_str()),
            Self::SuperAdmin | Self::SubSuperAdmin => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => formatter.write_str(SUPER_ADMIN_GROUP),
            Self::SubSuperAdmin => formatter.write_str(SUB_SUPER_ADMIN_GROUP),
            Self::TenantAdmin(tenant) => write!(formatter, "{TENANT_ADMIN_PREFIX}{tenant}"),
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
            .ok_or_else(|| AppError::Validation(format!("unknown role value '{value}'")))
    }
}

impl TryFrom<String> for Role {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.group_name()
    }
}

/// Returns whether a directory group is meaningful to the admin console.
///
/// Only `SA`, `SPA` and `TA_*` groups are visible; every other group in the
/// directory is ignored.
#[must_use]
pub fn is_administrative_group(name: &str) -> bool {
    Role::parse(name).is_some()
}
