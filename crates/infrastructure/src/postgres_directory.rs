use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use admiral_application::{DirectoryPage, DirectoryService};
use admiral_core::{AppError, AppResult};
use admiral_domain::{
    AccountAttributesInput, AccountProfile, AdminAccount, AdminGroup, AttributeFilter,
    ContinuationToken, NewAccountRecord,
};

use crate::keyset_cursor::{GROUPS_SCOPE, KeysetCursor, accounts_scope, members_scope};


const ACCOUNT_COLUMNS: &str = r#"
    a.username, a.sub, a.enabled, a.status, a.email, a.email_verified,
    a.phone_number, a.phone_number_verified, a.given_name, a.family_name,
    a.name, a.middle_name, a.nickname, a.locale, a.picture, a.profile,
    a.gender, a.birthdate, a.alter_email, a.voice_number,
    a.created_at, a.last_modified_at
"#;

/// PostgreSQL-backed admin directory.
#[derive(Clone)]
pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GroupRow {
    name: String,
    description: Option<String>,
    precedence: Option<i32>,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self) -> AppResult<AdminGroup> {
        AdminGroup::new(
            self.name,
            self.description,
            self.precedence,
            self.created_at,
            self.last_modified_at,
        )
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    username: String,
    sub: String,
    enabled: bool,
    status: String,
    email: Option<String>,
    email_verified: bool,
    phone_number: Option<String>,
    phone_number_verified: bool,
    given_name: Option<String>,
    family_name: Option<String>,
    name: Option<String>,
    middle_name: Option<String>,
    nickname: Option<String>,
    locale: Option<String>,
    picture: Option<String>,
    profile: Option<String>,
    gender: Option<String>,
    birthdate: Option<String>,
    alter_email: Option<String>,
    voice_number: Option<String>,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl From<AccountRow> for AdminAccount {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.username,
            enabled: row.enabled,
            status: row.status,
            profile: AccountProfile {
                sub: Some(row.sub),
                email: row.email,
                email_verified: row.email_verified,
                phone_number: row.phone_number,
                phone_number_verified: row.phone_number_verified,
                given_name: row.given_name,
                family_name: row.family_name,
                name: row.name,
                middle_name: row.middle_name,
                nickname: row.nickname,
                locale: row.locale,
                picture: row.picture,
                profile: row.profile,
                gender: row.gender,
                birthdate: row.birthdate,
                alter_email: row.alter_email,
                voice_number: row.voice_number,
            },
            groups: BTreeSet::new(),
            created_at: Some(row.created_at),
            last_modified_at: Some(row.last_modified_at),
        }
    }
}

/// Maps a database failure onto the application taxonomy.
///
/// Pool exhaustion surfaces as `Throttled` so callers can retry later.
fn directory_error(error: sqlx::Error, operation: &str) -> AppError {
    if matches!(error, sqlx::Error::PoolTimedOut) {
        return AppError::Throttled(format!("directory is busy, failed to {operation}"));
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

fn filter_column(filter: &AttributeFilter) -> &'static str {
    match filter {
        AttributeFilter::EmailPrefix(_) => "a.email",
        AttributeFilter::FamilyNamePrefix(_) => "a.family_name",
        AttributeFilter::GivenNamePrefix(_) => "a.given_name",
    }
}

/// Splits one extra row off a `LIMIT page_size + 1` result into a token.
fn into_page<T>(
    mut items: Vec<T>,
    page_size: i64,
    scope: &str,
    key_of: impl Fn(&T) -> &str,
) -> AppResult<DirectoryPage<T>> {
    let page_size = usize::try_from(page_size).unwrap_or(usize::MAX);
    if items.len() <= page_size {
        return Ok(DirectoryPage::new(items, None));
    }

    items.truncate(page_size);
    let next_token = match items.last() {
        Some(last) => Some(KeysetCursor::new(scope, key_of(last)).encode()?),
        None => None,
    };
    Ok(DirectoryPage::new(items, next_token))
}

fn push_page_bounds(
    builder: &mut QueryBuilder<'_, Postgres>,
    key_column: &str,
    after: Option<String>,
    page_size: i64,
) {
    if let Some(after) = after {
        builder.push(format!(" AND {key_column} > "));
        builder.push_bind(after);
    }
    builder.push(format!(" ORDER BY {key_column} ASC LIMIT "));
    builder.push_bind(page_size + 1);
}

#[async_trait]
impl DirectoryService for PostgresDirectory {
    async fn list_groups(
        &self,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminGroup>> {
        let after = KeysetCursor::resume_after(token, GROUPS_SCOPE)?;
        let page_size = i64::from(page_size.max(1));

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT name, description, precedence, created_at, last_modified_at FROM admin_groups WHERE true",
        );
        push_page_bounds(&mut builder, "name", after, page_size);

        let rows = builder
            .build_query_as::<GroupRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| directory_error(error, "list admin groups"))?;

        let page = into_page(rows, page_size, GROUPS_SCOPE, |row| row.name.as_str())?;
        let groups = page
            .items
            .into_iter()
            .map(GroupRow::into_group)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(DirectoryPage::new(groups, page.next_token))
    }

    async fn list_accounts(
        &self,
        filter: Option<&AttributeFilter>,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminAccount>> {
        let scope = accounts_scope(filter);
        let after = KeysetCursor::resume_after(token, scope.as_str())?;
        let page_size = i64::from(page_size.max(1));

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {ACCOUNT_COLUMNS} FROM admin_accounts a WHERE true"));
        if let Some(filter) = filter {
            builder.push(format!(" AND starts_with({}, ", filter_column(filter)));
            builder.push_bind(filter.prefix().to_owned());
            builder.push(")");
        }
        push_page_bounds(&mut builder, "a.username", after, page_size);

        let rows = builder
            .build_query_as::<AccountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| directory_error(error, "list admin accounts"))?;

        let page = into_page(rows, page_size, scope.as_str(), |row| row.username.as_str())?;
        Ok(DirectoryPage::new(
            page.items.into_iter().map(AdminAccount::from).collect(),
            page.next_token,
        ))
    }

    async fn list_accounts_in_group(
        &self,
        group: &str,
        page_size: u32,
        token: Option<&ContinuationToken>,
    ) -> AppResult<DirectoryPage<AdminAccount>> {
        let scope = members_scope(group);
        let after = KeysetCursor::resume_after(token, scope.as_str())?;
        let page_size = i64::from(page_size.max(1));

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {ACCOUNT_COLUMNS} FROM admin_accounts a \
             JOIN admin_group_memberships m ON m.username = a.username \
             WHERE m.group_name = "
        ));
        builder.push_bind(group.to_owned());
        push_page_bounds(&mut builder, "a.username", after, page_size);

        let rows = builder
            .build_query_as::<AccountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                directory_error(error, &format!("list members of admin group '{group}'"))
            })?;

        let page = into_page(rows, page_size, scope.as_str(), |row| row.username.as_str())?;
        Ok(DirectoryPage::new(
            page.items.into_iter().map(AdminAccount::from).collect(),
            page.next_token,
        ))
    }

    async fn get_account_groups(&self, account_id: &str) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT group_name
            FROM admin_group_memberships
            WHERE username = $1
            ORDER BY group_name
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            directory_error(error, &format!("list groups of admin account '{account_id}'"))
        })
    }

    async fn get_account(&self, account_id: &str) -> AppResult<Option<AdminAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM admin_accounts a WHERE a.username = $1"
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| directory_error(error, &format!("find admin account '{account_id}'")))?;

        Ok(row.map(AdminAccount::from))
    }

    async fn create_account(&self, record: NewAccountRecord) -> AppResult<AdminAccount> {
        let NewAccountRecord {
            username,
            profile,
            suppress_invitation,
        } = record;

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO admin_accounts AS a (
                username, sub, email, email_verified, phone_number,
                phone_number_verified, given_name, family_name, name,
                middle_name, nickname, locale, picture, profile, gender,
                birthdate, alter_email, voice_number, suppress_invitation
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19
            )
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(username.as_str())
        .bind(Uuid::new_v4().to_string())
        .bind(profile.email)
        .bind(profile.email_verified)
        .bind(profile.phone_number)
        .bind(profile.phone_number_verified)
        .bind(profile.given_name)
        .bind(profile.family_name)
        .bind(profile.name)
        .bind(profile.middle_name)
        .bind(profile.nickname)
        .bind(profile.locale)
        .bind(profile.picture)
        .bind(profile.profile)
        .bind(profile.gender)
        .bind(profile.birthdate)
        .bind(profile.alter_email)
        .bind(profile.voice_number)
        .bind(suppress_invitation)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!("admin account '{username}' already exists"));
            }

            directory_error(error, &format!("create admin account '{username}'"))
        })?;

        Ok(AdminAccount::from(row))
    }

    async fn add_account_to_group(&self, account_id: &str, group: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_group_memberships (username, group_name)
            VALUES ($1, $2)
            ON CONFLICT (username, group_name) DO NOTHING
            "#,
        )
        .bind(account_id)
        .bind(group)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23503")
            {
                return AppError::NotFound(format!(
                    "admin account '{account_id}' or group '{group}' not found"
                ));
            }

            directory_error(
                error,
                &format!("add admin account '{account_id}' to group '{group}'"),
            )
        })?;

        Ok(())
    }

    async fn update_account(
        &self,
        account_id: &str,
        attributes: AccountAttributesInput,
    ) -> AppResult<AdminAccount> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE admin_accounts AS a
            SET given_name = COALESCE($2, a.given_name),
                family_name = COALESCE($3, a.family_name),
                name = COALESCE($4, a.name),
                middle_name = COALESCE($5, a.middle_name),
                locale = COALESCE($6, a.locale),
                phone_number = COALESCE($7, a.phone_number),
                picture = COALESCE($8, a.picture),
                profile = COALESCE($9, a.profile),
                gender = COALESCE($10, a.gender),
                birthdate = COALESCE($11, a.birthdate),
                alter_email = COALESCE($12, a.alter_email),
                voice_number = COALESCE($13, a.voice_number),
                last_modified_at = now()
            WHERE a.username = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account_id)
        .bind(attributes.given_name)
        .bind(attributes.family_name)
        .bind(attributes.name)
        .bind(attributes.middle_name)
        .bind(attributes.locale)
        .bind(attributes.phone_number)
        .bind(attributes.picture)
        .bind(attributes.profile)
        .bind(attributes.gender)
        .bind(attributes.birthdate)
        .bind(attributes.alter_email)
        .bind(attributes.voice_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| directory_error(error, &format!("update admin account '{account_id}'")))?
        .ok_or_else(|| AppError::NotFound(format!("admin account '{account_id}' not found")))?;

        Ok(AdminAccount::from(row))
    }

    async fn delete_account(&self, account_id: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM admin_accounts
            WHERE username = $1
            "#,
        )
        .bind(account_id)
        .execute(&self.pool)
        .await
        .map_err(|error| directory_error(error, &format!("delete admin account '{account_id}'")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "admin account '{account_id}' not found"
            )));
        }

        Ok(())
    }
}
