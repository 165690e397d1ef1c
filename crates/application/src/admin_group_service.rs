use std::sync::Arc;

use tracing::warn;

use admiral_core::AppResult;
use admiral_domain::{
    AdminGroup, ContinuationToken, GroupCatalog, ListingPage, PageRequest, RequesterContext,
};

use crate::{DirectoryService, PaginationCoordinator, RangeConvention};

/// Default directory page size for group listing.
pub const DEFAULT_GROUP_PAGE_SIZE: u32 = 60;

/// Upper bound on directory pages read when collecting every group.
pub const MAX_GROUP_DIRECTORY_PAGES: u32 = 100;

/// Groups a requester may assign, with the reason when there are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignableGroups {
    /// Assignable group names.
    pub groups: Vec<String>,
    /// Explanation shown when `groups` is empty.
    pub reason: Option<String>,
}

/// Application service for administrative group listings.
#[derive(Clone)]
pub struct AdminGroupService {
    directory: Arc<dyn DirectoryService>,
    catalog: GroupCatalog,
    group_page_size: u32,
}

impl AdminGroupService {
    /// Creates a group service over a directory implementation.
    #[must_use]
    pub fn new(directory: Arc<dyn DirectoryService>, group_page_size: u32) -> Self {
        Self {
            directory,
            catalog: GroupCatalog,
            group_page_size: group_page_size.max(1),
        }
    }

    /// Lists one page of groups visible to the requester, sorted by name.
    ///
    /// Uses the 0-based range convention. A page after the first without a
    /// continuation token yields an empty page without touching the
    /// directory.
    pub async fn list_groups(
        &self,
        requester: &RequesterContext,
        request: &PageRequest,
    ) -> AppResult<ListingPage<AdminGroup>> {
        if let Some(skipped) = PaginationCoordinator::skipped_page(request, RangeConvention::GROUPS)
        {
            return Ok(skipped);
        }

        let page = self
            .directory
            .list_groups(self.group_page_size, request.continuation_token())
            .await?;

        let mut groups = self.catalog.eligible_groups(page.items, requester);
        groups.sort_by(|left, right| left.name().cmp(right.name()));

        Ok(PaginationCoordinator::assemble(
            request,
            RangeConvention::GROUPS,
            groups,
            page.next_token,
        ))
    }

    /// Lists the groups the requester may put a new account into.
    pub async fn list_assignable_groups(
        &self,
        requester: &RequesterContext,
    ) -> AppResult<AssignableGroups> {
        let directory_groups = self.all_directory_groups().await?;
        let groups = self.catalog.assignable_groups(requester, &directory_groups);
        let reason = groups.is_empty().then(|| {
            format!(
                "requester roles [{}] cannot assign any admin group",
                requester.role_names().join(", ")
            )
        });

        Ok(AssignableGroups { groups, reason })
    }

    async fn all_directory_groups(&self) -> AppResult<Vec<AdminGroup>> {
        let mut groups = Vec::new();
        let mut token: Option<ContinuationToken> = None;

        for _ in 0..MAX_GROUP_DIRECTORY_PAGES {
            let page = self
                .directory
                .list_groups(self.group_page_size, token.as_ref())
                .await?;
            groups.extend(page.items);

            match page.next_token {
                Some(next) if Some(&next) != token.as_ref() => token = Some(next),
                _ => return Ok(groups),
            }
        }

        warn!(
            pages_fetched = MAX_GROUP_DIRECTORY_PAGES,
            groups = groups.len(),
            "stopped collecting directory groups at the page bound"
        );
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use admiral_domain::{ContinuationToken, PageRequest, RoleResolver};

    use super::{AdminGroupService, MAX_GROUP_DIRECTORY_PAGES};
    use crate::test_directory::FakeDirectory;

    fn service(directory: &Arc<FakeDirectory>, page_size: u32) -> AdminGroupService {
        AdminGroupService::new(directory.clone(), page_size)
    }

    #[tokio::test]
    async fn group_listing_is_tiered_sorted_and_zero_based() {
        let directory = Arc::new(
            FakeDirectory::default()
                .with_groups(&["TA_ops", "SA", "pool_Google", "SPA", "TA_hr"]),
        );
        let Ok(request) = PageRequest::new(1, 10, None) else {
            panic!("page request should be valid");
        };

        let result = service(&directory, 60)
            .list_groups(&RoleResolver::from_tokens(["SPA"]), &request)
            .await;
        let Ok(page) = result else {
            panic!("listing should succeed");
        };

        let names: Vec<&str> = page.items.iter().map(|group| group.name()).collect();
        assert_eq!(names, vec!["SPA", "TA_hr", "TA_ops"]);
        assert_eq!(page.range.content_range("groups"), "groups 0-2");
        assert!(page.continuation_token.is_none());
    }

    #[tokio::test]
    async fn group_listing_skips_later_page_without_token() {
        let directory = Arc::new(FakeDirectory::default().with_groups(&["SA"]));
        let Ok(request) = PageRequest::new(3, 10, None) else {
            panic!("page request should be valid");
        };

        let result = service(&directory, 60)
            .list_groups(&RoleResolver::from_tokens(["SA"]), &request)
            .await;

        assert!(
            result.is_ok_and(|page| page.items.is_empty() && page.page_info.has_previous_page)
        );
        assert_eq!(directory.call_count().await, 0);
    }

    #[tokio::test]
    async fn group_listing_resumes_from_token() {
        let directory = Arc::new(FakeDirectory::default().with_groups(&["TA_a", "TA_b", "TA_c"]));
        let Ok(request) = PageRequest::new(2, 2, ContinuationToken::new("2")) else {
            panic!("page request should be valid");
        };

        let result = service(&directory, 2)
            .list_groups(&RoleResolver::from_tokens(["SA"]), &request)
            .await;
        let Ok(page) = result else {
            panic!("listing should succeed");
        };

        let names: Vec<&str> = page.items.iter().map(|group| group.name()).collect();
        assert_eq!(names, vec!["TA_c"]);
        assert_eq!(page.range.content_range("groups"), "groups 2-2");
    }

    #[tokio::test]
    async fn assignable_groups_walk_every_directory_page() {
        let directory = Arc::new(
            FakeDirectory::default()
                .with_groups(&["SA", "SPA", "TA_a", "TA_b", "TA_c"]),
        );

        let result = service(&directory, 2)
            .list_assignable_groups(&RoleResolver::from_tokens(["SA"]))
            .await;
        let Ok(assignable) = result else {
            panic!("assignable groups should resolve");
        };

        assert_eq!(assignable.groups, vec!["SPA", "TA_a", "TA_b", "TA_c"]);
        assert!(assignable.reason.is_none());
    }

    #[tokio::test]
    async fn requester_without_roles_gets_reason() {
        let directory = Arc::new(FakeDirectory::default().with_groups(&["SPA"]));

        let result = service(&directory, 60)
            .list_assignable_groups(&RoleResolver::from_tokens(["Everyone"]))
            .await;
        let Ok(assignable) = result else {
            panic!("assignable groups should resolve");
        };

        assert!(assignable.groups.is_empty());
        assert!(assignable.reason.is_some());
    }

    #[tokio::test]
    async fn group_collection_stops_at_page_bound() {
        let directory = Arc::new(
            FakeDirectory::default()
                .with_groups(&["SPA", "TA_ops"])
                .endless_group_pages(),
        );

        let result = service(&directory, 2)
            .list_assignable_groups(&RoleResolver::from_tokens(["SPA"]))
            .await;
        let Ok(assignable) = result else {
            panic!("assignable groups should resolve");
        };

        assert_eq!(assignable.groups, vec!["SPA", "TA_ops"]);
        assert_eq!(
            directory.calls_named("list_groups").await,
            usize::try_from(MAX_GROUP_DIRECTORY_PAGES).unwrap_or(usize::MAX)
        );
    }
}
