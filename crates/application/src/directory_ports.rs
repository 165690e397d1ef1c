use async_trait::async_trait;

use admiral_core::AppResult;
use admiral_domain::{
    AccountAttributesInput, AdminAccount, AdminGroup, AttributeFilter, ContinuationToken,
    NewAccountRecord,
};

/// One page returned by the backing directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPage<T> {
    /// Items in directory order.
    pub items: Vec<T>,
    /// Token resuming the same query; absent when the query is exhausted.
    pub next_token: Option<ContinuationToken>,
}

impl<T> DirectoryPage<T> {
    /// Creates a page from items and an optional resume token.
    #[must_use]
    pub fn new(items: Vec<T>, next_token: Option<ContinuationToken>) -> Self {
        Self { items, next_token }
    }
}

/// Port for the external account and group directory.
///
/// Reads are idempotent. Writes may be retried by the directory itself and
/// are never retried by callers. Tokens are only meaningful to the adapter
/// that issued them.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Lists one page of directory groups.
    async fn list_groups(
        &self,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminGroup>>;

    /// Lists one page of accounts, optionally restricted by an attribute prefix.
    async fn list_accounts(
        &self,
        filter: Option<&AttributeFilter>,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminAccount>>;

    /// Lists one page of the members of `group`.
    async fn list_accounts_in_group(
        &self,
        group: &str,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminAccount>>;

    /// Returns every group name the account belongs to.
    async fn get_account_groups(&self, account_id: &str) -> AppResult<Vec<String>>;

    /// Finds one account by identifier.
    async fn get_account(&self, account_id: &str) -> AppResult<Option<AdminAccount>>;

    /// Creates an account and returns it as stored.
    async fn create_account(&self, record: NewAccountRecord) -> AppResult<AdminAccount>;

    /// Adds an existing account to a group.
    async fn add_account_to_group(&self, account_id: &str, group: &str) -> AppResult<()>;

    /// Overwrites the supplied profile attributes and returns the account.
    async fn update_account(
        &self,
        account_id: &str,
        attributes: AccountAttributesInput,
    ) -> AppResult<AdminAccount>;

    /// Deletes an account.
    async fn delete_account(&self, account_id: &str) -> AppResult<()>;
}
