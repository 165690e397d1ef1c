use std::collections::BTreeSet;

use crate::group::AdminGroup;
use crate::requester::{DominantRole, RequesterContext};
use crate::role::{Role, RoleTier, SUB_SUPER_ADMIN_GROUP, SUPER_ADMIN_GROUP};

/// Computes which groups each role tier may see and assign.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupCatalog;

impl GroupCatalog {
    /// Filters directory groups down to the ones the requester may see.
    ///
    /// Non-administrative groups are always dropped. `SA` sees the rest,
    /// `SPA` everything but `SA`, a tenant administrator only their own
    /// groups and an empty requester nothing.
    #[must_use]
    pub fn eligible_groups(
        &self,
        groups: Vec<AdminGroup>,
        requester: &RequesterContext,
    ) -> Vec<AdminGroup> {
        let dominant = requester.dominant_role();
        groups
            .into_iter()
            .filter(AdminGroup::is_administrative)
            .filter(|group| match &dominant {
                DominantRole::SuperAdmin => true,
                DominantRole::SubSuperAdmin => group.name() != SUPER_ADMIN_GROUP,
                DominantRole::TenantAdmin(tenant_groups) => {
                    tenant_groups.iter().any(|name| name == group.name())
                }
                DominantRole::None => false,
            })
            .collect()
    }

    /// Lists the group names the requester may put a new account into.
    ///
    /// `SA` and `SPA` may assign `SPA` plus every tenant group known to the
    /// directory; a tenant administrator only their own groups, sorted and
    /// deduplicated. `SA` is never assignable.
    #[must_use]
    pub fn assignable_groups(
        &self,
        requester: &RequesterContext,
        directory_groups: &[AdminGroup],
    ) -> Vec<String> {
        match requester.dominant_role() {
            DominantRole::SuperAdmin | DominantRole::SubSuperAdmin => {
                let tenant_groups: BTreeSet<String> = directory_groups
                    .iter()
                    .filter(|group| {
                        Role::parse(group.name()).is_some_and(|role| role.tier() == RoleTier::TenantAdmin)
                    })
                    .map(|group| group.name().to_owned())
                    .collect();

                std::iter::once(SUB_SUPER_ADMIN_GROUP.to_owned())
                    .chain(tenant_groups)
                    .collect()
            }
            DominantRole::TenantAdmin(tenant_groups) => tenant_groups
                .into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            DominantRole::None => Vec::new(),
        }
    }

    /// Rewrites authorized groups into the memberships actually created.
    ///
    /// `SA` is dropped, `SPA` becomes the sole group when present, and
    /// duplicates are removed keeping first occurrence.
    #[must_use]
    pub fn normalize_assignment(&self, groups: &[String]) -> Vec<String> {
        if groups.iter().any(|group| group == SUB_SUPER_ADMIN_GROUP) {
            return vec![SUB_SUPER_ADMIN_GROUP.to_owned()];
        }

        let mut seen = BTreeSet::new();
        groups
            .iter()
            .filter(|group| group.as_str() != SUPER_ADMIN_GROUP)
            .filter(|group| seen.insert(group.as_str().to_owned()))
            .cloned()
            .collect()
    }
}
