use admiral_core::VerifiedClaims;
use serde_json::Value;

use crate::role::{Role, RoleTier};

/// Claim carrying the requester's group list when no other name is configured.
pub const DEFAULT_ROLE_CLAIM: &str = "cognito:groups";

/// Validated roles of the requester of one call.
///
/// Built fresh per request by [`RoleResolver`], never mutated afterwards.
/// Every element satisfies the role grammar; claim order and duplicates are
/// preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequesterContext {
    roles: Vec<Role>,
}

/// Single role that governs simplified control flow.
///
/// `SuperAdmin` wins over `SubSuperAdmin`, which wins over the full set of
/// tenant administrator groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DominantRole {
    /// Requester holds `SA`.
    SuperAdmin,
    /// Requester holds `SPA` but not `SA`.
    SubSuperAdmin,
    /// Requester holds only tenant administrator roles, listed by group name.
    TenantAdmin(Vec<String>),
    /// Requester holds no valid role.
    None,
}

impl RequesterContext {
    /// Returns every validated role in claim order.
    #[must_use]
    pub fn all_roles(&self) -> &[Role] {
        self.roles.as_slice()
    }

    /// Collapses the role set to the role with the highest authority.
    #[must_use]
    pub fn dominant_role(&self) -> DominantRole {
        if self.holds_tier(RoleTier::SuperAdmin) {
            return DominantRole::SuperAdmin;
        }

        if self.holds_tier(RoleTier::SubSuperAdmin) {
            return DominantRole::SubSuperAdmin;
        }

        let tenant_groups = self.tenant_admin_groups();
        if tenant_groups.is_empty() {
            DominantRole::None
        } else {
            DominantRole::TenantAdmin(tenant_groups)
        }
    }

    /// Returns whether no valid role was claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns whether any held role belongs to the given tier.
    #[must_use]
    pub fn holds_tier(&self, tier: RoleTier) -> bool {
        self.roles.iter().any(|role| role.tier() == tier)
    }

    /// Returns the group names of every tenant administrator role held.
    #[must_use]
    pub fn tenant_admin_groups(&self) -> Vec<String> {
        self.roles
            .iter()
            .filter(|role| role.tier() == RoleTier::TenantAdmin)
            .map(Role::group_name)
            .collect()
    }

    /// Returns whether the requester holds the tenant administrator group `group`.
    #[must_use]
    pub fn holds_tenant_group(&self, group: &str) -> bool {
        self.roles
            .iter()
            .any(|role| role.tier() == RoleTier::TenantAdmin && role.group_name() == group)
    }

    /// Returns every held role as its group name, for messages and logs.
    #[must_use]
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(Role::group_name).collect()
    }
}

/// Normalizes raw claim data into a [`RequesterContext`].
#[derive(Debug, Clone)]
pub struct RoleResolver {
    role_claim: String,
}

impl Default for RoleResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_CLAIM)
    }
}

impl RoleResolver {
    /// Creates a resolver reading roles from the named claim.
    #[must_use]
    pub fn new(role_claim: impl Into<String>) -> Self {
        Self {
            role_claim: role_claim.into(),
        }
    }

    /// Returns the claim this resolver reads.
    #[must_use]
    pub fn role_claim(&self) -> &str {
        self.role_claim.as_str()
    }

    /// Extracts the validated role set from verified claims.
    ///
    /// A missing claim, or a claim that is not a list, yields an empty
    /// context. List entries that are not strings or fall outside the role
    /// grammar are dropped.
    #[must_use]
    pub fn normalize(&self, claims: &VerifiedClaims) -> RequesterContext {
        match claims.claim(self.role_claim.as_str()) {
            Some(Value::Array(tokens)) => {
                Self::from_tokens(tokens.iter().filter_map(Value::as_str))
            }
            _ => RequesterContext::default(),
        }
    }

    /// Builds a context from already extracted claim tokens.
    #[must_use]
    pub fn from_tokens<I, S>(tokens: I) -> RequesterContext
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RequesterContext {
            roles: tokens
                .into_iter()
                .filter_map(|token| Role::parse(token.as_ref()))
                .collect(),
        }
    }
}
