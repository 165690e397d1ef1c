use admiral_core::AppResult;
use admiral_domain::{
    AdminAccount, AttributeFilter, ContinuationToken, DisplayRange, ListingPage, PageInfo,
    PageRequest, RangeOrigin, RequesterContext,
};

use crate::{AccountListingQuery, DirectoryLister};

/// How the total of a displayed range is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeTotal {
    /// The end index is reported as total.
    EndIndex,
    /// No total is reported.
    Unreported,
}

/// Range convention of one listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeConvention {
    /// First index of the first page.
    pub origin: RangeOrigin,
    /// Total reporting.
    pub total: RangeTotal,
}

impl RangeConvention {
    /// Account listing: 1-based, end index reported as total.
    pub const ACCOUNTS: Self = Self {
        origin: RangeOrigin::OneBased,
        total: RangeTotal::EndIndex,
    };

    /// Group listing: 0-based, no total.
    pub const GROUPS: Self = Self {
        origin: RangeOrigin::ZeroBased,
        total: RangeTotal::Unreported,
    };
}

/// Filters accepted by the account listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountListingFilter {
    /// Restricts the listing to one group.
    pub group: Option<String>,
    /// Prefix filter on profile attributes.
    pub attribute: Option<AttributeFilter>,
}

/// Translates page requests into directory queries and display ranges.
#[derive(Clone)]
pub struct PaginationCoordinator {
    lister: DirectoryLister,
}

impl PaginationCoordinator {
    /// Creates a coordinator over an account lister.
    #[must_use]
    pub fn new(lister: DirectoryLister) -> Self {
        Self { lister }
    }

    /// Returns the wrapped lister.
    #[must_use]
    pub fn lister(&self) -> &DirectoryLister {
        &self.lister
    }

    /// Lists one page of accounts.
    ///
    /// A page after the first without a continuation token yields an empty
    /// page without touching the directory.
    pub async fn list_accounts(
        &self,
        requester: &RequesterContext,
        request: &PageRequest,
        filter: AccountListingFilter,
    ) -> AppResult<ListingPage<AdminAccount>> {
        if let Some(skipped) = Self::skipped_page(request, RangeConvention::ACCOUNTS) {
            return Ok(skipped);
        }

        let batch = self
            .lister
            .list(
                requester,
                AccountListingQuery {
                    group_filter: filter.group,
                    attribute_filter: filter.attribute,
                    page_size: request.per_page(),
                    continuation_token: request.continuation_token().cloned(),
                },
            )
            .await?;

        Ok(Self::assemble(
            request,
            RangeConvention::ACCOUNTS,
            batch.accounts,
            batch.continuation_token,
        ))
    }

    /// Returns the empty page served when a later page arrives without token.
    #[must_use]
    pub fn skipped_page<T>(
        request: &PageRequest,
        convention: RangeConvention,
    ) -> Option<ListingPage<T>> {
        if request.page() <= 1 || request.continuation_token().is_some() {
            return None;
        }

        let start = request.start(convention.origin);
        let range = match convention.total {
            RangeTotal::EndIndex => DisplayRange {
                start,
                end: start,
                total: Some(0),
            },
            RangeTotal::Unreported => DisplayRange {
                start,
                end: start - 1,
                total: None,
            },
        };

        Some(ListingPage {
            items: Vec::new(),
            continuation_token: None,
            range,
            page_info: PageInfo {
                has_previous_page: true,
                has_next_page: false,
            },
        })
    }

    /// Wraps listed items into a page with its display range.
    #[must_use]
    pub fn assemble<T>(
        request: &PageRequest,
        convention: RangeConvention,
        items: Vec<T>,
        continuation_token: Option<ContinuationToken>,
    ) -> ListingPage<T> {
        let start = request.start(convention.origin);
        let count = i64::try_from(items.len()).unwrap_or(i64::MAX);
        let end = start + count - 1;
        let total = match convention.total {
            RangeTotal::EndIndex => Some(end),
            RangeTotal::Unreported => None,
        };

        ListingPage {
            page_info: PageInfo {
                has_previous_page: request.page() > 1,
                has_next_page: continuation_token.is_some(),
            },
            items,
            continuation_token,
            range: DisplayRange { start, end, total },
        }
    }
}
