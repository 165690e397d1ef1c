use std::sync::Arc;

use admiral_core::AppError;
use admiral_domain::{
    AccessPolicyEngine, AccountAttributesInput, ContinuationToken, DenialVerbosity,
    EmailAddress, NewAdminAccount, PageRequest, RoleResolver,
};

use crate::test_directory::FakeDirectory;
use crate::{AccountListingFilter, AdminGroupService, ListingLimits};

use super::AdminAccountService;

fn service(directory: &Arc<FakeDirectory>) -> AdminAccountService {
    AdminAccountService::new(
        directory.clone(),
        AdminGroupService::new(directory.clone(), 60),
        AccessPolicyEngine::default(),
        ListingLimits::default(),
    )
}

fn new_account(email: &str, groups: &[&str]) -> NewAdminAccount {
    let Ok(email) = EmailAddress::new(email) else {
        panic!("email should be valid");
    };
    NewAdminAccount {
        email,
        attributes: AccountAttributesInput {
            given_name: Some("Ada".to_owned()),
            family_name: Some("Lovelace".to_owned()),
            ..AccountAttributesInput::default()
        },
        groups: groups.iter().map(|group| (*group).to_owned()).collect(),
        notify: false,
    }
}

fn directory_with_groups() -> FakeDirectory {
    FakeDirectory::default().with_groups(&["SA", "SPA", "TA_ops", "TA_hr"])
}

#[tokio::test]
async fn later_page_without_token_skips_the_directory() {
    let directory = Arc::new(directory_with_groups().with_account("u1", &["TA_ops"]));
    let Ok(request) = PageRequest::new(2, 10, None) else {
        panic!("page request should be valid");
    };

    let result = service(&directory)
        .list_accounts(
            &RoleResolver::from_tokens(["SA"]),
            &request,
            AccountListingFilter::default(),
        )
        .await;
    let Ok(page) = result else {
        panic!("listing should succeed");
    };

    assert!(page.items.is_empty());
    assert!(page.page_info.has_previous_page);
    assert!(!page.page_info.has_next_page);
    assert_eq!(directory.call_count().await, 0);
}

#[tokio::test]
async fn continuation_token_resumes_where_previous_page_ended() {
    let directory = Arc::new(
        directory_with_groups()
            .with_account("a", &["TA_ops"])
            .with_account("b", &["TA_ops"])
            .with_account("c", &["TA_ops"])
            .with_account("d", &["TA_ops"])
            .with_account("e", &["TA_ops"]),
    );
    let service = service(&directory);
    let requester = RoleResolver::from_tokens(["TA_ops"]);

    let Ok(first_request) = PageRequest::new(1, 2, None) else {
        panic!("page request should be valid");
    };
    let Ok(first) = service
        .list_accounts(&requester, &first_request, AccountListingFilter::default())
        .await
    else {
        panic!("first page should list");
    };
    assert!(first.page_info.has_next_page);
    assert_eq!(first.range.content_range("users"), "users 1-2/2");

    let Ok(second_request) = PageRequest::new(2, 2, first.continuation_token.clone()) else {
        panic!("page request should be valid");
    };
    let Ok(second) = service
        .list_accounts(&requester, &second_request, AccountListingFilter::default())
        .await
    else {
        panic!("second page should list");
    };

    assert_eq!(second.range.start, first.range.end + 1);
    assert_eq!(
        second
            .items
            .iter()
            .map(|account| account.id.as_str())
            .collect::<Vec<_>>(),
        vec!["c", "d"]
    );
    assert!(second.page_info.has_previous_page);
}

#[tokio::test]
async fn sub_super_admin_cannot_create_super_admin_account() {
    let directory = Arc::new(directory_with_groups());

    let result = service(&directory)
        .create_account(
            &RoleResolver::from_tokens(["SPA"]),
            new_account("new@example.com", &["SA"]),
        )
        .await;

    let Err(AppError::Forbidden(message)) = result else {
        panic!("creation should be forbidden");
    };
    assert!(message.contains("SA"));
    assert!(message.contains("SPA, TA_hr, TA_ops"));
    assert_eq!(directory.calls_named("create_account").await, 0);
}

#[tokio::test]
async fn creation_without_groups_is_a_validation_failure() {
    let directory = Arc::new(directory_with_groups());

    let result = service(&directory)
        .create_account(
            &RoleResolver::from_tokens(["SA"]),
            new_account("new@example.com", &[]),
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn sub_super_admin_group_replaces_tenant_groups() {
    let directory = Arc::new(directory_with_groups());

    let result = service(&directory)
        .create_account(
            &RoleResolver::from_tokens(["SA"]),
            new_account("Deputy@Example.com", &["TA_ops", "SPA"]),
        )
        .await;
    let Ok(created) = result else {
        panic!("creation should succeed");
    };

    assert_eq!(created.id, "deputy@example.com");
    assert_eq!(created.groups.iter().cloned().collect::<Vec<_>>(), vec!["SPA"]);
    assert_eq!(created.profile.nickname.as_deref(), Some("Ada Lovelace"));
    assert!(created.profile.email_verified);
    assert_eq!(directory.memberships_of("deputy@example.com").await, vec!["SPA"]);
}

#[tokio::test]
async fn failed_group_assignment_keeps_the_account() {
    let directory = Arc::new(directory_with_groups().failing_assignment_to("TA_hr"));

    let result = service(&directory)
        .create_account(
            &RoleResolver::from_tokens(["SA"]),
            new_account("ops@example.com", &["TA_ops", "TA_hr"]),
        )
        .await;
    let Ok(created) = result else {
        panic!("creation should succeed");
    };

    assert_eq!(
        created.groups.iter().cloned().collect::<Vec<_>>(),
        vec!["TA_ops"]
    );
    assert!(directory.stored_account("ops@example.com").await.is_some());
}

#[tokio::test]
async fn tenant_admin_creates_only_in_own_groups() {
    let directory = Arc::new(directory_with_groups());
    let service = service(&directory);
    let requester = RoleResolver::from_tokens(["TA_ops"]);

    let allowed = service
        .create_account(&requester, new_account("one@example.com", &["TA_ops"]))
        .await;
    let denied = service
        .create_account(&requester, new_account("two@example.com", &["TA_ops", "TA_hr"]))
        .await;

    assert!(allowed.is_ok());
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    assert!(directory.stored_account("two@example.com").await.is_none());
}

#[tokio::test]
async fn get_missing_account_is_not_found() {
    let directory = Arc::new(directory_with_groups());

    let result = service(&directory)
        .get_account(&RoleResolver::from_tokens(["SA"]), "ghost")
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn get_account_merges_administrative_groups() {
    let directory = Arc::new(directory_with_groups().with_account("u1", &["TA_ops", "pool_x"]));

    let result = service(&directory)
        .get_account(&RoleResolver::from_tokens(["TA_ops"]), "u1")
        .await;

    assert!(result.is_ok_and(|account| account.groups.len() == 1 && account.is_member_of("TA_ops")));
}

#[tokio::test]
async fn tenant_admin_cannot_delete_outside_scope() {
    let directory = Arc::new(directory_with_groups().with_account("u1", &["TA_hr"]));

    let result = service(&directory)
        .delete_account(&RoleResolver::from_tokens(["TA_ops"]), "u1")
        .await;

    let Err(AppError::Forbidden(message)) = result else {
        panic!("deletion should be forbidden");
    };
    assert!(message.contains("TA_hr"));
    assert!(directory.stored_account("u1").await.is_some());
}

#[tokio::test]
async fn redacted_denials_hide_target_groups() {
    let directory = Arc::new(directory_with_groups().with_account("u1", &["TA_hr"]));
    let service = AdminAccountService::new(
        directory.clone(),
        AdminGroupService::new(directory.clone(), 60),
        AccessPolicyEngine::new(DenialVerbosity::Redacted),
        ListingLimits::default(),
    );

    let result = service
        .delete_account(&RoleResolver::from_tokens(["TA_ops"]), "u1")
        .await;

    let Err(AppError::Forbidden(message)) = result else {
        panic!("deletion should be forbidden");
    };
    assert!(!message.contains("TA_hr"));
}

#[tokio::test]
async fn delete_returns_identifier() {
    let directory = Arc::new(directory_with_groups().with_account("u1", &["TA_ops"]));

    let result = service(&directory)
        .delete_account(&RoleResolver::from_tokens(["SPA"]), "u1")
        .await;

    assert_eq!(result.unwrap_or_default(), "u1");
    assert!(directory.stored_account("u1").await.is_none());
}

#[tokio::test]
async fn update_changes_profile_and_keeps_groups() {
    let directory = Arc::new(directory_with_groups().with_account("u1", &["TA_ops"]));

    let result = service(&directory)
        .update_account(
            &RoleResolver::from_tokens(["TA_ops"]),
            "u1",
            AccountAttributesInput {
                locale: Some("de".to_owned()),
                given_name: Some("  ".to_owned()),
                ..AccountAttributesInput::default()
            },
        )
        .await;
    let Ok(updated) = result else {
        panic!("update should succeed");
    };

    assert_eq!(updated.profile.locale.as_deref(), Some("de"));
    assert_eq!(updated.profile.given_name.as_deref(), Some("u1"));
    assert!(updated.is_member_of("TA_ops"));
}

#[tokio::test]
async fn sub_super_admin_cannot_update_super_admin() {
    let directory = Arc::new(directory_with_groups().with_account("root", &["SA"]));

    let result = service(&directory)
        .update_account(
            &RoleResolver::from_tokens(["SPA"]),
            "root",
            AccountAttributesInput::default(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(directory.calls_named("update_account").await, 0);
}

#[tokio::test]
async fn explicit_token_on_later_page_is_forwarded() {
    let directory = Arc::new(
        directory_with_groups()
            .with_account("a", &["TA_ops"])
            .with_account("b", &["TA_ops"]),
    );
    let Ok(request) = PageRequest::new(2, 1, ContinuationToken::new("1")) else {
        panic!("page request should be valid");
    };

    let result = service(&directory)
        .list_accounts(
            &RoleResolver::from_tokens(["SA"]),
            &request,
            AccountListingFilter::default(),
        )
        .await;
    let Ok(page) = result else {
        panic!("listing should succeed");
    };

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.range.content_range("users"), "users 2-2/2");
    assert!(!page.page_info.has_next_page);
}

#[tokio::test]
async fn sub_super_admin_cannot_create_outside_assignable_groups() {
    let directory = Arc::new(directory_with_groups().with_groups(&["Everyone"]));
    let service = service(&directory);
    let requester = RoleResolver::from_tokens(["SPA"]);

    for (email, groups, offending) in [
        ("one@example.com", ["Everyone", "TA_ops"], "Everyone"),
        ("two@example.com", ["TA_ops", "TA_ghost"], "TA_ghost"),
    ] {
        let result = service
            .create_account(&requester, new_account(email, &groups))
            .await;

        let Err(AppError::Forbidden(message)) = result else {
            panic!("creation should be forbidden");
        };
        assert!(message.contains(offending));
        assert!(directory.stored_account(email).await.is_none());
    }
    assert_eq!(directory.calls_named("create_account").await, 0);
}

#[tokio::test]
async fn sub_super_admin_creates_in_known_tenant_group() {
    let directory = Arc::new(directory_with_groups());

    let result = service(&directory)
        .create_account(
            &RoleResolver::from_tokens(["SPA"]),
            new_account("hr@example.com", &["TA_hr"]),
        )
        .await;

    assert!(result.is_ok_and(|created| created.is_member_of("TA_hr")));
}

#[tokio::test]
async fn requester_without_roles_is_denied_before_any_lookup() {
    let directory = Arc::new(directory_with_groups().with_account("u1", &["TA_ops"]));
    let service = service(&directory);
    let requester = RoleResolver::from_tokens(["Everyone"]);

    let existing = service.get_account(&requester, "u1").await;
    let missing = service.get_account(&requester, "ghost").await;
    let deleted = service.delete_account(&requester, "ghost").await;
    let created = service
        .create_account(&requester, new_account("new@example.com", &["TA_ops"]))
        .await;

    assert!(matches!(existing, Err(AppError::Forbidden(_))));
    assert!(matches!(missing, Err(AppError::Forbidden(_))));
    assert!(matches!(deleted, Err(AppError::Forbidden(_))));
    assert!(matches!(created, Err(AppError::Forbidden(_))));
    assert_eq!(directory.call_count().await, 0);
}

#[tokio::test]
async fn tenant_admin_cannot_tell_missing_from_foreign_accounts() {
    let directory = Arc::new(directory_with_groups().with_account("u1", &["TA_hr"]));
    let service = service(&directory);
    let requester = RoleResolver::from_tokens(["TA_ops"]);

    let foreign = service.get_account(&requester, "u1").await;
    let missing = service
        .update_account(&requester, "ghost", AccountAttributesInput::default())
        .await;

    assert!(matches!(foreign, Err(AppError::Forbidden(_))));
    assert!(matches!(missing, Err(AppError::Forbidden(_))));
    assert_eq!(directory.calls_named("update_account").await, 0);
}
