use std::collections::BTreeSet;

use admiral_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, exactly one `@`,
    /// non-empty local part and a domain containing at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Profile attributes stored on an admin account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Stable subject identifier assigned by the directory.
    pub sub: Option<String>,
    /// Login email.
    pub email: Option<String>,
    /// Whether the email is verified.
    pub email_verified: bool,
    /// Phone number in E.164 form.
    pub phone_number: Option<String>,
    /// Whether the phone number is verified.
    pub phone_number_verified: bool,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Full display name.
    pub name: Option<String>,
    /// Middle name.
    pub middle_name: Option<String>,
    /// Nickname, derived from given and family name at creation.
    pub nickname: Option<String>,
    /// Preferred locale.
    pub locale: Option<String>,
    /// Picture URL.
    pub picture: Option<String>,
    /// Profile URL.
    pub profile: Option<String>,
    /// Gender.
    pub gender: Option<String>,
    /// Birthdate.
    pub birthdate: Option<String>,
    /// Secondary email address.
    pub alter_email: Option<String>,
    /// Voice call number.
    pub voice_number: Option<String>,
}

/// Admin account as read from the directory.
///
/// `groups` is never persisted by this subsystem; it is merged in from a
/// membership lookup at listing or decision time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    /// Username, doubling as the account identifier.
    pub id: String,
    /// Whether the account can sign in.
    pub enabled: bool,
    /// Directory account status, for example `CONFIRMED`.
    pub status: String,
    /// Profile attributes.
    pub profile: AccountProfile,
    /// Administrative group memberships.
    pub groups: BTreeSet<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl AdminAccount {
    /// Returns the account with its membership set replaced.
    #[must_use]
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = String>) -> Self {
        self.groups = groups.into_iter().collect();
        self
    }

    /// Returns whether the account belongs to `group`.
    #[must_use]
    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Returns whether the account shares at least one group with `groups`.
    #[must_use]
    pub fn shares_group_with(&self, groups: &[String]) -> bool {
        groups.iter().any(|group| self.groups.contains(group))
    }
}

/// Mutable profile attributes accepted on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountAttributesInput {
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Full display name.
    pub name: Option<String>,
    /// Middle name.
    pub middle_name: Option<String>,
    /// Preferred locale.
    pub locale: Option<String>,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Picture URL.
    pub picture: Option<String>,
    /// Profile URL.
    pub profile: Option<String>,
    /// Gender.
    pub gender: Option<String>,
    /// Birthdate.
    pub birthdate: Option<String>,
    /// Secondary email address.
    pub alter_email: Option<String>,
    /// Voice call number.
    pub voice_number: Option<String>,
}

impl AccountAttributesInput {
    /// Drops blank values so they are never written to the directory.
    #[must_use]
    pub fn without_blanks(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|value| !value.trim().is_empty())
        }

        Self {
            given_name: keep(self.given_name),
            family_name: keep(self.family_name),
            name: keep(self.name),
            middle_name: keep(self.middle_name),
            locale: keep(self.locale),
            phone_number: keep(self.phone_number),
            picture: keep(self.picture),
            profile: keep(self.profile),
            gender: keep(self.gender),
            birthdate: keep(self.birthdate),
            alter_email: keep(self.alter_email),
            voice_number: keep(self.voice_number),
        }
    }
}

/// Account creation request after transport parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdminAccount {
    /// Login email, also used as username.
    pub email: EmailAddress,
    /// Profile attributes.
    pub attributes: AccountAttributesInput,
    /// Groups the new account should join.
    pub groups: Vec<String>,
    /// Whether the directory should send the invitation message.
    pub notify: bool,
}

/// Account record handed to the directory for creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccountRecord {
    /// Username of the new account.
    pub username: String,
    /// Profile to store.
    pub profile: AccountProfile,
    /// Whether the invitation message is suppressed.
    pub suppress_invitation: bool,
}

impl NewAdminAccount {
    /// Builds the directory record for this request.
    ///
    /// The email is marked verified so it can be used to sign in, phone
    /// numbers supplied at creation are marked verified too, and the
    /// nickname is `"<given_name> <family_name>"`.
    #[must_use]
    pub fn to_record(&self) -> NewAccountRecord {
        let attributes = self.attributes.clone().without_blanks();
        let nickname = format!(
            "{} {}",
            attributes.given_name.as_deref().unwrap_or_default(),
            attributes.family_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_owned();

        NewAccountRecord {
            username: self.email.as_str().to_owned(),
            profile: AccountProfile {
                sub: None,
                email: Some(self.email.as_str().to_owned()),
                email_verified: true,
                phone_number_verified: attributes.phone_number.is_some(),
                phone_number: attributes.phone_number,
                given_name: attributes.given_name,
                family_name: attributes.family_name,
                name: attributes.name,
                middle_name: attributes.middle_name,
                nickname: (!nickname.is_empty()).then_some(nickname),
                locale: attributes.locale,
                picture: attributes.picture,
                profile: attributes.profile,
                gender: attributes.gender,
                birthdate: attributes.birthdate,
                alter_email: attributes.alter_email,
                voice_number: attributes.voice_number,
            },
            suppress_invitation: !self.notify,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{AccountAttributesInput, AccountProfile, AdminAccount, EmailAddress, NewAdminAccount};

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = EmailAddress::new("  Ops.Lead@Example.COM ");
        assert_eq!(
            email.map(String::from).unwrap_or_default(),
            "ops.lead@example.com"
        );
    }

    #[test]
    fn email_requires_single_at_and_dotted_domain() {
        assert!(EmailAddress::new("a@@example.com").is_err());
        assert!(EmailAddress::new("a@example").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
    }

    #[test]
    fn record_derives_nickname_and_verification_flags() {
        let Ok(email) = EmailAddress::new("jo@example.com") else {
            panic!("valid email rejected");
        };
        let request = NewAdminAccount {
            email,
            attributes: AccountAttributesInput {
                given_name: Some("Jo".to_owned()),
                family_name: Some("Doe".to_owned()),
                locale: Some(" ".to_owned()),
                ..AccountAttributesInput::default()
            },
            groups: vec!["TA_ops".to_owned()],
            notify: false,
        };

        let record = request.to_record();
        assert_eq!(record.username, "jo@example.com");
        assert_eq!(record.profile.nickname.as_deref(), Some("Jo Doe"));
        assert!(record.profile.email_verified);
        assert!(!record.profile.phone_number_verified);
        assert_eq!(record.profile.locale, None);
        assert!(record.suppress_invitation);
    }

    #[test]
    fn shares_group_checks_intersection() {
        let account = AdminAccount {
            id: "u1".to_owned(),
            enabled: true,
            status: "CONFIRMED".to_owned(),
            profile: AccountProfile::default(),
            groups: BTreeSet::new(),
            created_at: None,
            last_modified_at: None,
        }
        .with_groups(["TA_ops".to_owned(), "TA_hr".to_owned()]);

        assert!(account.shares_group_with(&["TA_hr".to_owned()]));
        assert!(!account.shares_group_with(&["TA_sales".to_owned()]));
        assert!(account.is_member_of("TA_ops"));
    }
}
