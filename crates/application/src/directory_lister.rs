//! Paginated account listing.
//!
//! Pulls directory pages until a page worth of accounts is accumulated,
//! merges each account's administrative group memberships, then applies the
//! role hierarchy and sorts by account id.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use admiral_core::AppResult;
use admiral_domain::{
    AccessPolicyEngine, AccessTarget, AdminAccount, AdminOperation, AttributeFilter,
    ContinuationToken, DominantRole, RequesterContext, SUPER_ADMIN_GROUP,
    is_administrative_group,
};

use crate::{DirectoryPage, DirectoryService};


/// Default bound on consecutive empty directory pages per listing.
pub const DEFAULT_MAX_CONSECUTIVE_EMPTY_PAGES: u32 = 20;

/// Default bound on concurrent membership lookups.
pub const DEFAULT_MEMBERSHIP_FAN_OUT: usize = 16;

/// Resource bounds applied to one listing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLimits {
    /// Accumulation stops after this many empty pages in a row.
    pub max_consecutive_empty_pages: u32,
    /// Upper bound on concurrent membership lookups.
    pub membership_fan_out: usize,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            max_consecutive_empty_pages: DEFAULT_MAX_CONSECUTIVE_EMPTY_PAGES,
            membership_fan_out: DEFAULT_MEMBERSHIP_FAN_OUT,
        }
    }
}

/// Account listing query after transport parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountListingQuery {
    /// Restricts the listing to the members of one group.
    pub group_filter: Option<String>,
    /// Prefix filter for the global listing. Ignored with a group filter.
    pub attribute_filter: Option<AttributeFilter>,
    /// Number of accounts wanted.
    pub page_size: u32,
    /// Token returned with the previous page.
    pub continuation_token: Option<ContinuationToken>,
}

/// Accounts accumulated for one page and the token resuming the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBatch {
    /// Accounts sorted by id.
    pub accounts: Vec<AdminAccount>,
    /// Token resuming the directory query; absent when exhausted.
    pub continuation_token: Option<ContinuationToken>,
}

/// Loop state of one accumulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulationState {
    /// Accounts collected so far.
    pub accumulated: Vec<AdminAccount>,
    /// Empty pages received in a row.
    pub consecutive_empty_pages: u32,
    /// Token for the next directory call.
    pub token: Option<ContinuationToken>,
    /// Directory pages fetched so far.
    pub pages_fetched: u32,
}

impl AccumulationState {
    /// Starts a run resuming from `token`.
    #[must_use]
    pub fn new(token: Option<ContinuationToken>) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Number of accounts still missing to fill `page_size`.
    #[must_use]
    pub fn remaining(&self, page_size: u32) -> u32 {
        let accumulated = u32::try_from(self.accumulated.len()).unwrap_or(u32::MAX);
        page_size.saturating_sub(accumulated)
    }

    /// Folds one directory page into the state.
    pub fn record_page(&mut self, page: DirectoryPage<AdminAccount>) {
        self.pages_fetched = self.pages_fetched.saturating_add(1);
        if page.items.is_empty() {
            self.consecutive_empty_pages = self.consecutive_empty_pages.saturating_add(1);
        } else {
            self.consecutive_empty_pages = 0;
        }
        self.accumulated.extend(page.items);
        self.token = page.next_token;
    }

    /// Returns whether accumulation must stop.
    ///
    /// Stops once the page is full, the directory reported no further token,
    /// or too many empty pages arrived in a row.
    #[must_use]
    pub fn is_complete(&self, page_size: u32, limits: &ListingLimits) -> bool {
        self.remaining(page_size) == 0
            || (self.pages_fetched > 0 && self.token.is_none())
            || self.consecutive_empty_pages >= limits.max_consecutive_empty_pages
    }
}

/// Retrieves, merges and bounds paginated account listings.
#[derive(Clone)]
pub struct DirectoryLister {
    directory: Arc<dyn DirectoryService>,
    policy: AccessPolicyEngine,
    limits: ListingLimits,
}

impl DirectoryLister {
    /// Creates a lister over a directory implementation.
    #[must_use]
    pub fn new(
        directory: Arc<dyn DirectoryService>,
        policy: AccessPolicyEngine,
        limits: ListingLimits,
    ) -> Self {
        Self {
            directory,
            policy,
            limits,
        }
    }

    /// Returns the configured bounds.
    #[must_use]
    pub fn limits(&self) -> ListingLimits {
        self.limits
    }

    /// Lists one page of accounts visible to the requester.
    ///
    /// A group filter is authorized up front and returns `Forbidden` when the
    /// requester may not view that group. Without one, the accumulated page
    /// is narrowed by the requester's tier; a requester without roles gets an
    /// empty page and the directory is not contacted. Directory query
    /// failures abort the call, membership lookup failures only degrade the
    /// affected account.
    pub async fn list(
        &self,
        requester: &RequesterContext,
        query: AccountListingQuery,
    ) -> AppResult<AccountBatch> {
        if let Some(group) = query.group_filter.as_deref() {
            self.policy
                .decide(
                    requester,
                    AdminOperation::List,
                    Some(AccessTarget::GroupView { group }),
                )
                .require()?;
        } else if requester.is_empty() {
            debug!("requester holds no roles; returning empty listing");
            return Ok(AccountBatch::default());
        }

        let mut state = AccumulationState::new(query.continuation_token.clone());
        while !state.is_complete(query.page_size, &self.limits) {
            let remaining = state.remaining(query.page_size);
            let page = match query.group_filter.as_deref() {
                Some(group) => {
                    self.directory
                        .list_accounts_in_group(group, remaining, state.token.as_ref())
                        .await?
                }
                None => {
                    self.directory
                        .list_accounts(
                            query.attribute_filter.as_ref(),
                            remaining,
                            state.token.as_ref(),
                        )
                        .await?
                }
            };

            let accounts = self.merge_memberships(page.items).await;
            state.record_page(DirectoryPage::new(accounts, page.next_token));
        }

        if state.consecutive_empty_pages >= self.limits.max_consecutive_empty_pages {
            warn!(
                pages_fetched = state.pages_fetched,
                page_size = query.page_size,
                "stopped account listing after consecutive empty directory pages"
            );
        }

        let AccumulationState {
            accumulated, token, ..
        } = state;

        let mut accounts = if query.group_filter.is_some() {
            accumulated
        } else {
            filter_by_hierarchy(accumulated, requester)
        };
        accounts.sort_by(|left, right| left.id.cmp(&right.id));

        Ok(AccountBatch {
            accounts,
            continuation_token: token,
        })
    }

    /// Resolves the administrative groups of one account.
    pub async fn account_groups(&self, account_id: &str) -> AppResult<Vec<String>> {
        let groups = self.directory.get_account_groups(account_id).await?;
        Ok(groups
            .into_iter()
            .filter(|group| is_administrative_group(group))
            .collect())
    }

    /// Merges memberships into each account with bounded concurrency.
    ///
    /// Every account owns one result slot allocated up front. A failed or
    /// panicked lookup leaves its slot empty, so that account is returned
    /// with no memberships.
    async fn merge_memberships(&self, accounts: Vec<AdminAccount>) -> Vec<AdminAccount> {
        if accounts.is_empty() {
            return accounts;
        }

        let permits = self.limits.membership_fan_out.clamp(1, accounts.len());
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut slots: Vec<Option<Vec<String>>> = vec![None; accounts.len()];
        let mut lookups = JoinSet::new();

        for (index, account) in accounts.iter().enumerate() {
            let directory = Arc::clone(&self.directory);
            let semaphore = Arc::clone(&semaphore);
            let account_id = account.id.clone();
            lookups.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = directory.get_account_groups(&account_id).await;
                (index, account_id, result)
            });
        }

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((index, _, Ok(groups))) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(groups);
                    }
                }
                Ok((_, account_id, Err(error))) => {
                    warn!(
                        account_id = %account_id,
                        error = %error,
                        "failed to resolve account groups; listing account without memberships"
                    );
                }
                Err(error) => {
                    warn!(error = %error, "account group lookup task failed");
                }
            }
        }

        accounts
            .into_iter()
            .zip(slots)
            .map(|(account, groups)| {
                account.with_groups(
                    groups
                        .unwrap_or_default()
                        .into_iter()
                        .filter(|group| is_administrative_group(group)),
                )
            })
            .collect()
    }
}

/// Narrows accounts to what the requester's tier may see.
fn filter_by_hierarchy(
    accounts: Vec<AdminAccount>,
    requester: &RequesterContext,
) -> Vec<AdminAccount> {
    match requester.dominant_role() {
        DominantRole::SuperAdmin => accounts,
        DominantRole::SubSuperAdmin => accounts
            .into_iter()
            .filter(|account| !account.is_member_of(SUPER_ADMIN_GROUP))
            .collect(),
        DominantRole::TenantAdmin(tenant_groups) => accounts
            .into_iter()
            .filter(|account| account.shares_group_with(&tenant_groups))
            .collect(),
        DominantRole::None => Vec::new(),
    }
}
