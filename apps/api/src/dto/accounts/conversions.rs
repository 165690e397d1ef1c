use std::collections::BTreeMap;

use admiral_application::{AccountListingFilter, AssignableGroups};
use admiral_core::{AppError, AppResult};
use admiral_domain::{
    AccountAttributesInput, AdminAccount, AttributeFilter, ContinuationToken, EmailAddress,
    ListingPage, NewAdminAccount, PageRequest,
};
use serde_json::Value;

use super::types::{
    AdminAccountResponse, AdminAttributesRequest, AdminListResponse, AssignableGroupsResponse,
    CreateAdminRequest, ListAdminsQuery, PageInfoResponse,
};

const DEFAULT_PER_PAGE: u32 = 10;

impl ListAdminsQuery {
    pub fn page_request(&self) -> AppResult<PageRequest> {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(DEFAULT_PER_PAGE),
            self.continuation_token
                .clone()
                .and_then(ContinuationToken::new),
        )
    }

    /// Parses the JSON `filter` parameter.
    ///
    /// A non-empty `groups` entry restricts the listing to that group; the
    /// prefix filter is picked from `email`, `family_name` and `given_name`.
    /// Non-string values are ignored.
    pub fn listing_filter(&self) -> AppResult<AccountListingFilter> {
        let Some(raw) = self.filter.as_deref().filter(|raw| !raw.trim().is_empty()) else {
            return Ok(AccountListingFilter::default());
        };

        let parsed: BTreeMap<String, Value> = serde_json::from_str(raw)
            .map_err(|error| AppError::Validation(format!("invalid filter: {error}")))?;
        let values: BTreeMap<String, String> = parsed
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(value) => Some((key, value)),
                _ => None,
            })
            .collect();

        Ok(AccountListingFilter {
            group: values
                .get("groups")
                .filter(|group| !group.is_empty())
                .cloned(),
            attribute: AttributeFilter::from_filter_map(&values),
        })
    }
}

impl From<AdminAccount> for AdminAccountResponse {
    fn from(account: AdminAccount) -> Self {
        let profile = account.profile;
        Self {
            username: account.id.clone(),
            id: account.id,
            enabled: account.enabled,
            status: account.status,
            sub: profile.sub,
            email: profile.email,
            email_verified: profile.email_verified,
            phone_number: profile.phone_number,
            phone_number_verified: profile.phone_number_verified,
            given_name: profile.given_name,
            family_name: profile.family_name,
            name: profile.name,
            middle_name: profile.middle_name,
            nickname: profile.nickname,
            locale: profile.locale,
            picture: profile.picture,
            profile: profile.profile,
            gender: profile.gender,
            birthdate: profile.birthdate,
            alter_email: profile.alter_email,
            voice_number: profile.voice_number,
            groups: account.groups.into_iter().collect(),
            created_at: account.created_at.map(|value| value.to_rfc3339()),
            last_modified_at: account.last_modified_at.map(|value| value.to_rfc3339()),
        }
    }
}

impl From<ListingPage<AdminAccount>> for AdminListResponse {
    fn from(page: ListingPage<AdminAccount>) -> Self {
        Self {
            data: page
                .items
                .into_iter()
                .map(AdminAccountResponse::from)
                .collect(),
            page_info: PageInfoResponse {
                has_previous_page: page.page_info.has_previous_page,
                has_next_page: page.page_info.has_next_page,
            },
            continuation_token: page.continuation_token.map(String::from),
        }
    }
}

impl From<AdminAttributesRequest> for AccountAttributesInput {
    fn from(request: AdminAttributesRequest) -> Self {
        Self {
            given_name: request.given_name,
            family_name: request.family_name,
            name: request.name,
            middle_name: request.middle_name,
            locale: request.locale,
            phone_number: request.phone_number,
            picture: request.picture,
            profile: request.profile,
            gender: request.gender,
            birthdate: request.birthdate,
            alter_email: request.alter_email,
            voice_number: request.voice_number,
        }
    }
}

impl CreateAdminRequest {
    pub fn into_new_account(self) -> AppResult<NewAdminAccount> {
        Ok(NewAdminAccount {
            email: EmailAddress::new(self.email)?,
            attributes: self.attributes.into(),
            groups: self.groups,
            notify: self.notify,
        })
    }
}

impl From<AssignableGroups> for AssignableGroupsResponse {
    fn from(value: AssignableGroups) -> Self {
        Self {
            groups: value.groups,
            reason: value.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use admiral_core::AppError;
    use admiral_domain::AttributeFilter;

    use super::ListAdminsQuery;

    fn query_with_filter(filter: &str) -> ListAdminsQuery {
        ListAdminsQuery {
            filter: Some(filter.to_owned()),
            ..ListAdminsQuery::default()
        }
    }

    #[test]
    fn filter_picks_group_and_highest_priority_attribute() {
        let query = query_with_filter(
            r#"{"groups":"TA_ops","given_name":"Al","email":"al@","family_name":"Sm"}"#,
        );

        let Ok(filter) = query.listing_filter() else {
            panic!("filter should parse");
        };
        assert_eq!(filter.group.as_deref(), Some("TA_ops"));
        assert_eq!(
            filter.attribute,
            Some(AttributeFilter::EmailPrefix("al@".to_owned()))
        );
    }

    #[test]
    fn empty_groups_value_does_not_filter() {
        let Ok(filter) = query_with_filter(r#"{"groups":""}"#).listing_filter() else {
            panic!("filter should parse");
        };
        assert!(filter.group.is_none());
        assert!(filter.attribute.is_none());
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let result = query_with_filter("{groups").listing_filter();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn page_request_defaults_to_first_page() {
        let request = ListAdminsQuery::default().page_request();
        assert!(request.is_ok_and(|request| request.page() == 1 && request.per_page() == 10));
    }
}
