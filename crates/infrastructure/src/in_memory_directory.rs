use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use admiral_application::{DirectoryPage, DirectoryService};
use admiral_core::{AppError, AppResult};
use admiral_domain::{
    AccountAttributesInput, AccountProfile, AdminAccount, AdminGroup, AttributeFilter,
    ContinuationToken, NewAccountRecord, SUB_SUPER_ADMIN_GROUP, SUPER_ADMIN_GROUP,
};

use crate::keyset_cursor::{GROUPS_SCOPE, KeysetCursor, accounts_scope, members_scope};


/// In-memory directory implementation.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    groups: RwLock<BTreeMap<String, AdminGroup>>,
    accounts: RwLock<BTreeMap<String, AdminAccount>>,
    memberships: RwLock<BTreeMap<String, BTreeSet<String>>>,
}

impl InMemoryDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding the `SA` and `SPA` groups.
    pub fn seeded() -> AppResult<Self> {
        let now = Utc::now();
        let mut groups = BTreeMap::new();
        for (name, description, precedence) in [
            (SUPER_ADMIN_GROUP, "Super administrators", 0),
            (SUB_SUPER_ADMIN_GROUP, "Sub super administrators", 1),
        ] {
            groups.insert(
                name.to_owned(),
                AdminGroup::new(name, Some(description.to_owned()), Some(precedence), now, now)?,
            );
        }

        Ok(Self {
            groups: RwLock::new(groups),
            ..Self::default()
        })
    }

    /// Stores a group, replacing any group with the same name.
    pub async fn save_group(&self, group: AdminGroup) {
        self.groups
            .write()
            .await
            .insert(group.name().to_owned(), group);
    }
}

fn page_after<T>(
    entries: impl Iterator<Item = (String, T)>,
    page_size: u32,
    scope: &str,
) -> AppResult<DirectoryPage<T>> {
    let page_size = usize::try_from(page_size).unwrap_or(usize::MAX).max(1);
    let mut items: Vec<(String, T)> = entries.take(page_size.saturating_add(1)).collect();

    let next_token = if items.len() > page_size {
        items.truncate(page_size);
        match items.last() {
            Some((key, _)) => Some(KeysetCursor::new(scope, key.as_str()).encode()?),
            None => None,
        }
    } else {
        None
    };

    Ok(DirectoryPage::new(
        items.into_iter().map(|(_, item)| item).collect(),
        next_token,
    ))
}

fn matches_filter(account: &AdminAccount, filter: &AttributeFilter) -> bool {
    let value = match filter {
        AttributeFilter::EmailPrefix(_) => account.profile.email.as_deref(),
        AttributeFilter::FamilyNamePrefix(_) => account.profile.family_name.as_deref(),
        AttributeFilter::GivenNamePrefix(_) => account.profile.given_name.as_deref(),
    };
    value.is_some_and(|value| value.starts_with(filter.prefix()))
}

fn apply_attributes(profile: &mut AccountProfile, attributes: AccountAttributesInput) {
    let AccountAttributesInput {
        given_name,
        family_name,
        name,
        middle_name,
        locale,
        phone_number,
        picture,
        profile: profile_url,
        gender,
        birthdate,
        alter_email,
        voice_number,
    } = attributes;

    for (slot, value) in [
        (&mut profile.given_name, given_name),
        (&mut profile.family_name, family_name),
        (&mut profile.name, name),
        (&mut profile.middle_name, middle_name),
        (&mut profile.locale, locale),
        (&mut profile.phone_number, phone_number),
        (&mut profile.picture, picture),
        (&mut profile.profile, profile_url),
        (&mut profile.gender, gender),
        (&mut profile.birthdate, birthdate),
        (&mut profile.alter_email, alter_email),
        (&mut profile.voice_number, voice_number),
    ] {
        if value.is_some() {
            *slot = value;
        }
    }
}

fn is_after(key: &str, after: Option<&str>) -> bool {
    after.is_none_or(|after| key > after)
}

#[async_trait]
impl DirectoryService for InMemoryDirectory {
    async fn list_groups(
        &self,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminGroup>> {
        let after = KeysetCursor::resume_after(token, GROUPS_SCOPE)?;
        let groups = self.groups.read().await;

        page_after(
            groups
                .iter()
                .filter(|(name, _)| is_after(name, after.as_deref()))
                .map(|(name, group)| (name.clone(), group.clone())),
            page_size,
            GROUPS_SCOPE,
        )
    }

    async fn list_accounts(
        &self,
        filter: Option<&AttributeFilter>,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminAccount>> {
        let scope = accounts_scope(filter);
        let after = KeysetCursor::resume_after(token, scope.as_str())?;
        let accounts = self.accounts.read().await;

        page_after(
            accounts
                .iter()
                .filter(|(id, _)| is_after(id, after.as_deref()))
                .filter(|(_, account)| {
                    filter.is_none_or(|filter| matches_filter(account, filter))
                })
                .map(|(id, account)| (id.clone(), account.clone())),
            page_size,
            scope.as_str(),
        )
    }

    async fn list_accounts_in_group(
        &self,
        group: &str,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminAccount>> {
        let scope = members_scope(group);
        let after = KeysetCursor::resume_after(token, scope.as_str())?;
        let accounts = self.accounts.read().await;
        let memberships = self.memberships.read().await;

        page_after(
            accounts
                .iter()
                .filter(|(id, _)| is_after(id, after.as_deref()))
                .filter(|(id, _)| {
                    memberships
                        .get(id.as_str())
                        .is_some_and(|groups| groups.contains(group))
                })
                .map(|(id, account)| (id.clone(), account.clone())),
            page_size,
            scope.as_str(),
        )
    }

    async fn get_account_groups(&self, account_id: &str) -> AppResult<Vec<String>> {
        if !self.accounts.read().await.contains_key(account_id) {
            return Err(AppError::NotFound(format!(
                "admin account '{account_id}' not found"
            )));
        }

        Ok(self
            .memberships
            .read()
            .await
            .get(account_id)
            .map(|groups| groups.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_account(&self, account_id: &str) -> AppResult<Option<AdminAccount>> {
        Ok(self.accounts.read().await.get(account_id).cloned())
    }

    async fn create_account(&self, record: NewAccountRecord) -> AppResult<AdminAccount> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&record.username) {
            return Err(AppError::Conflict(format!(
                "admin account '{}' already exists",
                record.username
            )));
        }

        let now = Utc::now();
        let mut profile = record.profile;
        profile.sub = Some(Uuid::new_v4().to_string());

        let account = AdminAccount {
            id: record.username.clone(),
            enabled: true,
            status: "FORCE_CHANGE_PASSWORD".to_owned(),
            profile,
            groups: BTreeSet::new(),
            created_at: Some(now),
            last_modified_at: Some(now),
        };
        accounts.insert(record.username, account.clone());

        Ok(account)
    }

    async fn add_account_to_group(&self, account_id: &str, group: &str) -> AppResult<()> {
        if !self.groups.read().await.contains_key(group) {
            return Err(AppError::NotFound(format!("admin group '{group}' not found")));
        }
        if !self.accounts.read().await.contains_key(account_id) {
            return Err(AppError::NotFound(format!(
                "admin account '{account_id}' not found"
            )));
        }

        self.memberships
            .write()
            .await
            .entry(account_id.to_owned())
            .or_default()
            .insert(group.to_owned());

        Ok(())
    }

    async fn update_account(
        &self,
        account_id: &str,
        attributes: AccountAttributesInput,
    ) -> AppResult<AdminAccount> {
        let mut accounts = self.accounts.write().await;
        let Some(account) = accounts.get_mut(account_id) else {
            return Err(AppError::NotFound(format!(
                "admin account '{account_id}' not found"
            )));
        };

        apply_attributes(&mut account.profile, attributes);
        account.last_modified_at = Some(Utc::now());

        Ok(account.clone())
    }

    async fn delete_account(&self, account_id: &str) -> AppResult<()> {
        if self.accounts.write().await.remove(account_id).is_none() {
            return Err(AppError::NotFound(format!(
                "admin account '{account_id}' not found"
            )));
        }

        self.memberships.write().await.remove(account_id);
        Ok(())
    }
}
