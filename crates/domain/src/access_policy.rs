//! Access decisions for operations on admin accounts and groups.
//!
//! The engine is pure: membership lookups happen before `decide` is called,
//! so every rule here can be evaluated without touching the directory.

use std::collections::BTreeSet;

use admiral_core::{AppError, AppResult};

use crate::requester::RequesterContext;
use crate::role::{RoleTier, SUPER_ADMIN_GROUP};


/// Operation requested on an admin account or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminOperation {
    /// Read one account.
    Read,
    /// Update one account.
    Update,
    /// Delete one account.
    Delete,
    /// Create an account and assign it to groups.
    Create,
    /// List accounts or groups.
    List,
}

impl AdminOperation {
    /// Returns a stable verb used in messages and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Create => "create",
            Self::List => "list",
        }
    }

    /// Returns whether the operation is a listing.
    #[must_use]
    pub fn is_listing(&self) -> bool {
        matches!(self, Self::List)
    }
}

/// Target of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTarget<'a> {
    /// Existing account with its resolved group memberships.
    ExistingAccount {
        /// Account identifier.
        account_id: &'a str,
        /// Administrative groups the account belongs to.
        groups: &'a BTreeSet<String>,
    },
    /// Groups requested for a brand-new account.
    GroupAssignment {
        /// Requested group names.
        groups: &'a [String],
        /// Groups the requester may assign. Bounds `SPA` assignment and is
        /// reported back on denial.
        assignable: &'a [String],
    },
    /// Group whose members the requester wants to view.
    GroupView {
        /// Group name.
        group: &'a str,
    },
}

/// Why an operation was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialKind {
    /// Requester claimed no valid role.
    NoRequesterRoles,
    /// Per-target operation without a target.
    NoTarget,
    /// `SPA` requester touching an `SA` account or group.
    SuperAdminProtected,
    /// Tenant administrator acting outside their own groups.
    OutsideTenantScope,
    /// A requested group may not be assigned by this requester.
    GroupNotAssignable {
        /// First offending group.
        group: String,
        /// Groups the requester may assign.
        permitted: Vec<String>,
    },
    /// Requester roles grant nothing for this operation.
    NotAuthorized,
}

/// Denial with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    kind: DenialKind,
    message: String,
}

impl Denial {
    /// Returns the machine-readable kind.
    #[must_use]
    pub fn kind(&self) -> &DenialKind {
        &self.kind
    }

    /// Returns the human-readable reason.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Outcome of an access decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Operation may proceed.
    Allow,
    /// Listing without a target: proceed but yield nothing.
    EmptyResult,
    /// Operation must not proceed.
    Deny(Denial),
}

impl AccessDecision {
    /// Returns whether the decision allows the operation.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts the decision into an application result.
    ///
    /// A missing target surfaces as a validation failure, every other denial
    /// as `Forbidden`.
    pub fn require(self) -> AppResult<()> {
        match self {
            Self::Allow | Self::EmptyResult => Ok(()),
            Self::Deny(denial) => match denial.kind {
                DenialKind::NoTarget => Err(AppError::Validation(denial.message)),
                _ => Err(AppError::Forbidden(format!(
                    "access denied: {}",
                    denial.message
                ))),
            },
        }
    }
}

/// Controls whether denial messages reveal the target's group memberships.
///
/// Including memberships helps auditing but discloses information about the
/// target; the choice is left to configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DenialVerbosity {
    /// Denials name the target's groups.
    #[default]
    Detailed,
    /// Denials omit the target's groups.
    Redacted,
}

/// Decides whether a requester may perform an operation on a target.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicyEngine {
    verbosity: DenialVerbosity,
}

impl AccessPolicyEngine {
    /// Creates an engine with the given denial verbosity.
    #[must_use]
    pub fn new(verbosity: DenialVerbosity) -> Self {
        Self { verbosity }
    }

    /// Returns the configured denial verbosity.
    #[must_use]
    pub fn verbosity(&self) -> DenialVerbosity {
        self.verbosity
    }

    /// Evaluates the decision table for one operation.
    ///
    /// Rules apply in order: no roles, no target, `SA`, `SPA`, tenant
    /// administrator, fallback deny. Group assignment is checked group by
    /// group and fails on the first group the requester may not assign.
    #[must_use]
    pub fn decide(
        &self,
        requester: &RequesterContext,
        operation: AdminOperation,
        target: Option<AccessTarget<'_>>,
    ) -> AccessDecision {
        if requester.is_empty() {
            return deny(DenialKind::NoRequesterRoles, "no requester roles provided");
        }

        let target = match target {
            Some(AccessTarget::GroupAssignment { groups, .. }) if groups.is_empty() => None,
            other => other,
        };

        let Some(target) = target else {
            if operation.is_listing() {
                return AccessDecision::EmptyResult;
            }
            return deny(DenialKind::NoTarget, "no target specified");
        };

        if requester.holds_tier(RoleTier::SuperAdmin) {
            return AccessDecision::Allow;
        }

        match target {
            AccessTarget::ExistingAccount { account_id, groups } => {
                self.decide_existing_account(requester, operation, account_id, groups)
            }
            AccessTarget::GroupAssignment { groups, assignable } => {
                decide_group_assignment(requester, groups, assignable)
            }
            AccessTarget::GroupView { group } => decide_group_view(requester, operation, group),
        }
    }

    fn decide_existing_account(
        &self,
        requester: &RequesterContext,
        operation: AdminOperation,
        account_id: &str,
        groups: &BTreeSet<String>,
    ) -> AccessDecision {
        if requester.holds_tier(RoleTier::SubSuperAdmin) {
            if groups.contains(SUPER_ADMIN_GROUP) {
                return deny(
                    DenialKind::SuperAdminProtected,
                    format!(
                        "SPA cannot perform {} operation on SA accounts",
                        operation.as_str()
                    ),
                );
            }
            return AccessDecision::Allow;
        }

        let tenant_groups = requester.tenant_admin_groups();
        if !tenant_groups.is_empty() {
            if tenant_groups.iter().any(|group| groups.contains(group)) {
                return AccessDecision::Allow;
            }

            let scope = format!(
                "TA requester with roles [{}] can only perform {} operation on accounts in their groups",
                tenant_groups.join(", "),
                operation.as_str()
            );
            let message = match self.verbosity {
                DenialVerbosity::Detailed => format!(
                    "{scope}. Target account '{account_id}' has groups: [{}]",
                    groups.iter().cloned().collect::<Vec<_>>().join(", ")
                ),
                DenialVerbosity::Redacted => scope,
            };
            return deny(DenialKind::OutsideTenantScope, message);
        }

        not_authorized(requester, operation)
    }
}

fn decide_group_assignment(
    requester: &RequesterContext,
    groups: &[String],
    assignable: &[String],
) -> AccessDecision {
    let sub_super_admin = requester.holds_tier(RoleTier::SubSuperAdmin);
    let tenant_admin = requester.holds_tier(RoleTier::TenantAdmin);
    if !sub_super_admin && !tenant_admin {
        return not_authorized(requester, AdminOperation::Create);
    }

    for group in groups {
        let allowed = if sub_super_admin {
            group != SUPER_ADMIN_GROUP && assignable.contains(group)
        } else {
            requester.holds_tenant_group(group)
        };

        if !allowed {
            let tier = if sub_super_admin { "SPA" } else { "TA" };
            return deny(
                DenialKind::GroupNotAssignable {
                    group: group.clone(),
                    permitted: assignable.to_vec(),
                },
                format!(
                    "{tier} requester with roles [{}] cannot create an account with group: {group}. Allowed groups: [{}]",
                    requester.role_names().join(", "),
                    assignable.join(", ")
                ),
            );
        }
    }

    AccessDecision::Allow
}

fn decide_group_view(
    requester: &RequesterContext,
    operation: AdminOperation,
    group: &str,
) -> AccessDecision {
    if requester.holds_tier(RoleTier::SubSuperAdmin) {
        if group == SUPER_ADMIN_GROUP {
            return deny(
                DenialKind::SuperAdminProtected,
                format!("SPA cannot perform {} operation on SA group", operation.as_str()),
            );
        }
        return AccessDecision::Allow;
    }

    if requester.holds_tier(RoleTier::TenantAdmin) {
        if requester.holds_tenant_group(group) {
            return AccessDecision::Allow;
        }
        return deny(
            DenialKind::OutsideTenantScope,
            format!(
                "TA requester with roles [{}] can only perform {} operation on their own groups, not '{group}'",
                requester.tenant_admin_groups().join(", "),
                operation.as_str()
            ),
        );
    }

    not_authorized(requester, operation)
}

fn not_authorized(requester: &RequesterContext, operation: AdminOperation) -> AccessDecision {
    deny(
        DenialKind::NotAuthorized,
        format!(
            "requester roles [{}] are not authorized to perform {} operation",
            requester.role_names().join(", "),
            operation.as_str()
        ),
    )
}

fn deny(kind: DenialKind, message: impl Into<String>) -> AccessDecision {
    AccessDecision::Deny(Denial {
        kind,
        message: message.into(),
    })
}
