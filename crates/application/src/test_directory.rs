use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use admiral_core::{AppError, AppResult};
use admiral_domain::{
    AccountAttributesInput, AccountProfile, AdminAccount, AdminGroup, AttributeFilter,
    ContinuationToken, NewAccountRecord,
};

use crate::{DirectoryPage, DirectoryService};

/// Directory fake with offset tokens and a call log.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    state: RwLock<FakeDirectoryState>,
    lookups_in_flight: AtomicUsize,
    peak_lookups_in_flight: AtomicUsize,
}

#[derive(Default)]
struct FakeDirectoryState {
    groups: Vec<AdminGroup>,
    accounts: BTreeMap<String, AdminAccount>,
    memberships: BTreeMap<String, Vec<String>>,
    failing_lookups: BTreeSet<String>,
    failing_assignments: BTreeSet<String>,
    failing_queries_after: Option<usize>,
    account_page_cap: Option<u32>,
    endless_groups: bool,
    sparse: bool,
    calls: Vec<String>,
}

pub(crate) fn account(id: &str) -> AdminAccount {
    AdminAccount {
        id: id.to_owned(),
        enabled: true,
        status: "CONFIRMED".to_owned(),
        profile: AccountProfile {
            email: Some(format!("{id}@example.com")),
            given_name: Some(id.to_owned()),
            ..AccountProfile::default()
        },
        groups: BTreeSet::new(),
        created_at: None,
        last_modified_at: None,
    }
}

impl FakeDirectory {
    pub(crate) fn with_groups(mut self, names: &[&str]) -> Self {
        let now = Utc::now();
        let state = self.state.get_mut();
        state.groups.extend(
            names
                .iter()
                .filter_map(|name| AdminGroup::new(*name, None, None, now, now).ok()),
        );
        self
    }

    pub(crate) fn with_account(mut self, id: &str, groups: &[&str]) -> Self {
        let state = self.state.get_mut();
        state.accounts.insert(id.to_owned(), account(id));
        state.memberships.insert(
            id.to_owned(),
            groups.iter().map(|group| (*group).to_owned()).collect(),
        );
        self
    }

    pub(crate) fn failing_lookup_for(mut self, id: &str) -> Self {
        self.state.get_mut().failing_lookups.insert(id.to_owned());
        self
    }

    pub(crate) fn failing_assignment_to(mut self, group: &str) -> Self {
        self.state
            .get_mut()
            .failing_assignments
            .insert(group.to_owned());
        self
    }

    /// Account queries fail once `successful` of them have been answered.
    pub(crate) fn failing_queries_after(mut self, successful: usize) -> Self {
        self.state.get_mut().failing_queries_after = Some(successful);
        self
    }

    pub(crate) fn capping_account_pages_at(mut self, page_size: u32) -> Self {
        self.state.get_mut().account_page_cap = Some(page_size);
        self
    }

    /// Group pages always carry a fresh continuation token.
    pub(crate) fn endless_group_pages(mut self) -> Self {
        self.state.get_mut().endless_groups = true;
        self
    }

    pub(crate) fn peak_lookups_in_flight(&self) -> usize {
        self.peak_lookups_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn sparse(mut self) -> Self {
        self.state.get_mut().sparse = true;
        self
    }

    pub(crate) async fn call_count(&self) -> usize {
        self.state.read().await.calls.len()
    }

    pub(crate) async fn calls_named(&self, name: &str) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|call| call.as_str() == name)
            .count()
    }

    pub(crate) async fn stored_account(&self, id: &str) -> Option<AdminAccount> {
        self.state.read().await.accounts.get(id).cloned()
    }

    pub(crate) async fn memberships_of(&self, id: &str) -> Vec<String> {
        self.state
            .read()
            .await
            .memberships
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

impl FakeDirectoryState {
    fn account_query(&mut self, name: &str, page_size: u32) -> AppResult<u32> {
        let answered = self
            .calls
            .iter()
            .filter(|call| call.starts_with("list_accounts"))
            .count();
        self.calls.push(name.to_owned());
        if self
            .failing_queries_after
            .is_some_and(|successful| answered >= successful)
        {
            return Err(AppError::Internal("directory query failed".to_owned()));
        }

        Ok(self
            .account_page_cap
            .map_or(page_size, |cap| page_size.min(cap)))
    }

    fn account_groups(&self, account_id: &str) -> AppResult<Vec<String>> {
        if self.failing_lookups.contains(account_id) {
            return Err(AppError::Internal("membership lookup failed".to_owned()));
        }
        Ok(self
            .memberships
            .get(account_id)
            .cloned()
            .unwrap_or_default())
    }
}

fn offset_of(token: Option<&ContinuationToken>) -> AppResult<usize> {
    token.map_or(Ok(0), |token| {
        token
            .as_str()
            .parse()
            .map_err(|_| AppError::Validation("invalid continuation token".to_owned()))
    })
}

fn page_of<T>(items: Vec<T>, offset: usize, page_size: u32) -> DirectoryPage<T> {
    let page_size = usize::try_from(page_size).unwrap_or(usize::MAX);
    let total = items.len();
    let end = offset.saturating_add(page_size).min(total);
    let next_token = (end < total)
        .then(|| ContinuationToken::new(end.to_string()))
        .flatten();
    DirectoryPage::new(
        items.into_iter().skip(offset).take(end.saturating_sub(offset)).collect(),
        next_token,
    )
}

fn matches_filter(account: &AdminAccount, filter: &AttributeFilter) -> bool {
    let value = match filter {
        AttributeFilter::EmailPrefix(_) => account.profile.email.as_deref(),
        AttributeFilter::FamilyNamePrefix(_) => account.profile.family_name.as_deref(),
        AttributeFilter::GivenNamePrefix(_) => account.profile.given_name.as_deref(),
    };
    value.is_some_and(|value| value.starts_with(filter.prefix()))
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn list_groups(
        &self,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminGroup>> {
        let mut state = self.state.write().await;
        state.calls.push("list_groups".to_owned());
        let offset = offset_of(token)?;
        if state.endless_groups {
            return Ok(DirectoryPage::new(
                state.groups.clone(),
                ContinuationToken::new(offset.saturating_add(1).to_string()),
            ));
        }
        Ok(page_of(state.groups.clone(), offset, page_size))
    }

    async fn list_accounts(
        &self,
        filter: Option<&AttributeFilter>,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminAccount>> {
        let mut state = self.state.write().await;
        let page_size = state.account_query("list_accounts", page_size)?;
        if state.sparse {
            return Ok(DirectoryPage::new(Vec::new(), ContinuationToken::new("sparse")));
        }

        let accounts = state
            .accounts
            .values()
            .filter(|account| filter.is_none_or(|filter| matches_filter(account, filter)))
            .cloned()
            .collect();
        Ok(page_of(accounts, offset_of(token)?, page_size))
    }

    async fn list_accounts_in_group(
        &self,
        group: &str,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminAccount>> {
        let mut state = self.state.write().await;
        let page_size = state.account_query("list_accounts_in_group", page_size)?;
        let accounts = state
            .accounts
            .values()
            .filter(|account| {
                state
                    .memberships
                    .get(&account.id)
                    .is_some_and(|groups| groups.iter().any(|name| name == group))
            })
            .cloned()
            .collect();
        Ok(page_of(accounts, offset_of(token)?, page_size))
    }

    async fn get_account_groups(&self, account_id: &str) -> AppResult<Vec<String>> {
        let in_flight = self.lookups_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_lookups_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let result = {
            let mut state = self.state.write().await;
            state.calls.push("get_account_groups".to_owned());
            state.account_groups(account_id)
        };
        self.lookups_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn get_account(&self, account_id: &str) -> AppResult<Option<AdminAccount>> {
        let mut state = self.state.write().await;
        state.calls.push("get_account".to_owned());
        Ok(state.accounts.get(account_id).cloned())
    }

    async fn create_account(&self, record: NewAccountRecord) -> AppResult<AdminAccount> {
        let mut state = self.state.write().await;
        state.calls.push("create_account".to_owned());
        if state.accounts.contains_key(&record.username) {
            return Err(AppError::Conflict(format!(
                "account '{}' already exists",
                record.username
            )));
        }

        let created = AdminAccount {
            id: record.username.clone(),
            enabled: true,
            status: "FORCE_CHANGE_PASSWORD".to_owned(),
            profile: record.profile,
            groups: BTreeSet::new(),
            created_at: Some(Utc::now()),
            last_modified_at: Some(Utc::now()),
        };
        state.accounts.insert(record.username, created.clone());
        Ok(created)
    }

    async fn add_account_to_group(&self, account_id: &str, group: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.calls.push("add_account_to_group".to_owned());
        if state.failing_assignments.contains(group) {
            return Err(AppError::Throttled("too many requests".to_owned()));
        }
        state
            .memberships
            .entry(account_id.to_owned())
            .or_default()
            .push(group.to_owned());
        Ok(())
    }

    async fn update_account(
        &self,
        account_id: &str,
        attributes: AccountAttributesInput,
    ) -> AppResult<AdminAccount> {
        let mut state = self.state.write().await;
        state.calls.push("update_account".to_owned());
        let Some(account) = state.accounts.get_mut(account_id) else {
            return Err(AppError::NotFound(format!("account '{account_id}' not found")));
        };

        if let Some(given_name) = attributes.given_name {
            account.profile.given_name = Some(given_name);
        }
        if let Some(family_name) = attributes.family_name {
            account.profile.family_name = Some(family_name);
        }
        if let Some(locale) = attributes.locale {
            account.profile.locale = Some(locale);
        }
        Ok(account.clone())
    }

    async fn delete_account(&self, account_id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.calls.push("delete_account".to_owned());
        state.accounts.remove(account_id);
        state.memberships.remove(account_id);
        Ok(())
    }
}
