//! Admin account lifecycle and listing service.
//!
//! Every operation on an existing account rejects a requester without roles
//! before touching the directory, then resolves the account and its
//! administrative memberships and asks the access policy engine.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use admiral_core::{AppError, AppResult};
use admiral_domain::{
    AccessPolicyEngine, AccessTarget, AccountAttributesInput, AdminAccount, AdminOperation,
    GroupCatalog, ListingPage, NewAdminAccount, PageRequest, RequesterContext,
};

use crate::{
    AccountListingFilter, AdminGroupService, DirectoryLister, DirectoryService, ListingLimits,
    PaginationCoordinator,
};

#[cfg(test)]
mod tests;

/// Application service for admin accounts.
#[derive(Clone)]
pub struct AdminAccountService {
    directory: Arc<dyn DirectoryService>,
    pagination: PaginationCoordinator,
    groups: AdminGroupService,
    policy: AccessPolicyEngine,
    catalog: GroupCatalog,
}

impl AdminAccountService {
    /// Creates an account service over a directory implementation.
    #[must_use]
    pub fn new(
        directory: Arc<dyn DirectoryService>,
        groups: AdminGroupService,
        policy: AccessPolicyEngine,
        limits: ListingLimits,
    ) -> Self {
        let lister = DirectoryLister::new(directory.clone(), policy, limits);
        Self {
            directory,
            pagination: PaginationCoordinator::new(lister),
            groups,
            policy,
            catalog: GroupCatalog,
        }
    }

    /// Lists one page of accounts visible to the requester.
    pub async fn list_accounts(
        &self,
        requester: &RequesterContext,
        request: &PageRequest,
        filter: AccountListingFilter,
    ) -> AppResult<ListingPage<AdminAccount>> {
        self.pagination
            .list_accounts(requester, request, filter)
            .await
    }

    /// Returns one account with its administrative memberships.
    pub async fn get_account(
        &self,
        requester: &RequesterContext,
        account_id: &str,
    ) -> AppResult<AdminAccount> {
        self.authorized_account(requester, AdminOperation::Read, account_id)
            .await
    }

    /// Updates profile attributes of an account. Memberships are untouched.
    pub async fn update_account(
        &self,
        requester: &RequesterContext,
        account_id: &str,
        attributes: AccountAttributesInput,
    ) -> AppResult<AdminAccount> {
        let existing = self
            .authorized_account(requester, AdminOperation::Update, account_id)
            .await?;

        let updated = self
            .directory
            .update_account(existing.id.as_str(), attributes.without_blanks())
            .await?;

        info!(account_id = %existing.id, "updated admin account");
        Ok(updated.with_groups(existing.groups))
    }

    /// Deletes an account and returns its identifier.
    pub async fn delete_account(
        &self,
        requester: &RequesterContext,
        account_id: &str,
    ) -> AppResult<String> {
        let existing = self
            .authorized_account(requester, AdminOperation::Delete, account_id)
            .await?;

        self.directory.delete_account(existing.id.as_str()).await?;

        info!(
            account_id = %existing.id,
            requester_roles = ?requester.role_names(),
            "deleted admin account"
        );
        Ok(existing.id)
    }

    /// Creates an account and assigns its groups.
    ///
    /// Every requested group must be assignable by the requester. `SA` is
    /// never assigned and `SPA` replaces every other group. Group
    /// assignments run concurrently; a failed assignment is logged and the
    /// account keeps the groups that succeeded.
    pub async fn create_account(
        &self,
        requester: &RequesterContext,
        input: NewAdminAccount,
    ) -> AppResult<AdminAccount> {
        if requester.is_empty() {
            self.policy
                .decide(requester, AdminOperation::Create, None)
                .require()?;
        }

        let assignable = self.groups.list_assignable_groups(requester).await?.groups;

        self.policy
            .decide(
                requester,
                AdminOperation::Create,
                Some(AccessTarget::GroupAssignment {
                    groups: &input.groups,
                    assignable: &assignable,
                }),
            )
            .require()?;

        let groups = self.catalog.normalize_assignment(&input.groups);
        let created = self.directory.create_account(input.to_record()).await?;
        let assigned = self.assign_groups(created.id.as_str(), groups).await;

        info!(
            account_id = %created.id,
            groups = ?assigned,
            requester_roles = ?requester.role_names(),
            "created admin account"
        );
        Ok(created.with_groups(assigned))
    }

    async fn authorized_account(
        &self,
        requester: &RequesterContext,
        operation: AdminOperation,
        account_id: &str,
    ) -> AppResult<AdminAccount> {
        if requester.is_empty() {
            self.policy.decide(requester, operation, None).require()?;
        }

        let Some(account) = self.directory.get_account(account_id).await? else {
            return Err(self.missing_account(requester, operation, account_id));
        };

        let groups = self.pagination.lister().account_groups(account_id).await?;
        let account = account.with_groups(groups);

        self.policy
            .decide(
                requester,
                operation,
                Some(AccessTarget::ExistingAccount {
                    account_id: account.id.as_str(),
                    groups: &account.groups,
                }),
            )
            .require()?;

        Ok(account)
    }

    /// A missing account has no memberships. Requesters that would be denied
    /// on an empty group set get that denial instead of `NotFound`.
    fn missing_account(
        &self,
        requester: &RequesterContext,
        operation: AdminOperation,
        account_id: &str,
    ) -> AppError {
        let no_groups = BTreeSet::new();
        let decision = self.policy.decide(
            requester,
            operation,
            Some(AccessTarget::ExistingAccount {
                account_id,
                groups: &no_groups,
            }),
        );

        match decision.require() {
            Err(denied) => denied,
            Ok(()) => AppError::NotFound(format!("admin account '{account_id}' not found")),
        }
    }

    async fn assign_groups(&self, account_id: &str, groups: Vec<String>) -> Vec<String> {
        let mut assignments = JoinSet::new();
        for group in groups {
            let directory = Arc::clone(&self.directory);
            let account_id = account_id.to_owned();
            assignments.spawn(async move {
                let result = directory.add_account_to_group(&account_id, &group).await;
                (group, result)
            });
        }

        let mut assigned = Vec::new();
        while let Some(joined) = assignments.join_next().await {
            match joined {
                Ok((group, Ok(()))) => assigned.push(group),
                Ok((group, Err(error))) => {
                    warn!(
                        account_id,
                        group = %group,
                        error = %error,
                        "failed to add new admin account to group"
                    );
                }
                Err(error) => {
                    warn!(account_id, error = %error, "group assignment task failed");
                }
            }
        }

        assigned
    }
}
