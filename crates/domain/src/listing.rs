use std::collections::BTreeMap;

use admiral_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Opaque value that resumes a paginated directory query.
///
/// Never parsed outside the directory adapter that issued it; callers only
/// round-trip it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wraps a raw token. Empty input means "no token".
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        (!raw.is_empty()).then_some(Self(raw))
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ContinuationToken> for String {
    fn from(value: ContinuationToken) -> Self {
        value.0
    }
}

/// Prefix filter applied by the directory to a global account listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeFilter {
    /// Email starts with the value.
    EmailPrefix(String),
    /// Family name starts with the value.
    FamilyNamePrefix(String),
    /// Given name starts with the value.
    GivenNamePrefix(String),
}

impl AttributeFilter {
    /// Picks the filter from a transport filter map.
    ///
    /// `email` wins over `family_name`, which wins over `given_name`. Empty
    /// values are ignored.
    #[must_use]
    pub fn from_filter_map(filter: &BTreeMap<String, String>) -> Option<Self> {
        let value_of = |key: &str| {
            filter
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
        };

        value_of("email")
            .map(Self::EmailPrefix)
            .or_else(|| value_of("family_name").map(Self::FamilyNamePrefix))
            .or_else(|| value_of("given_name").map(Self::GivenNamePrefix))
    }

    /// Returns the attribute name the filter applies to.
    #[must_use]
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::EmailPrefix(_) => "email",
            Self::FamilyNamePrefix(_) => "family_name",
            Self::GivenNamePrefix(_) => "given_name",
        }
    }

    /// Returns the prefix value.
    #[must_use]
    pub fn prefix(&self) -> &str {
        match self {
            Self::EmailPrefix(value)
            | Self::FamilyNamePrefix(value)
            | Self::GivenNamePrefix(value) => value.as_str(),
        }
    }
}

/// Origin of the displayed range of a listing endpoint.
///
/// Account listing counts from 1 while group listing counts from 0. Both are
/// kept on purpose until the product decides on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOrigin {
    /// `start = (page - 1) * per_page + 1`.
    OneBased,
    /// `start = (page - 1) * per_page`.
    ZeroBased,
}

/// Externally visible page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
    continuation_token: Option<ContinuationToken>,
}

impl PageRequest {
    /// Creates a validated page request. Both numbers are 1-based and positive.
    pub fn new(
        page: u32,
        per_page: u32,
        continuation_token: Option<ContinuationToken>,
    ) -> AppResult<Self> {
        if page == 0 {
            return Err(AppError::Validation("page must be at least 1".to_owned()));
        }

        if per_page == 0 {
            return Err(AppError::Validation(
                "perPage must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            page,
            per_page,
            continuation_token,
        })
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Returns the token supplied with the request.
    #[must_use]
    pub fn continuation_token(&self) -> Option<&ContinuationToken> {
        self.continuation_token.as_ref()
    }

    /// Returns the first displayed index for the given origin.
    #[must_use]
    pub fn start(&self, origin: RangeOrigin) -> i64 {
        let offset = (i64::from(self.page) - 1) * i64::from(self.per_page);
        match origin {
            RangeOrigin::OneBased => offset + 1,
            RangeOrigin::ZeroBased => offset,
        }
    }
}

/// Inclusive displayed range of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRange {
    /// First displayed index.
    pub start: i64,
    /// Last displayed index; `start - 1` for an empty page.
    pub end: i64,
    /// Reported total, when the endpoint reports one.
    pub total: Option<i64>,
}

impl DisplayRange {
    /// Renders the range as `"<entity> start-end[/total]"`.
    #[must_use]
    pub fn content_range(&self, entity: &str) -> String {
        match self.total {
            Some(total) => format!("{entity} {}-{}/{total}", self.start, self.end),
            None => format!("{entity} {}-{}", self.start, self.end),
        }
    }
}

/// Neighbouring page availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// A previous page exists.
    pub has_previous_page: bool,
    /// A next page can be requested with the returned token.
    pub has_next_page: bool,
}

/// One page of a listing with its continuation token and displayed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage<T> {
    /// Items in display order.
    pub items: Vec<T>,
    /// Token resuming the query; absent when no further pages exist.
    pub continuation_token: Option<ContinuationToken>,
    /// Displayed inclusive range.
    pub range: DisplayRange,
    /// Neighbouring page availability.
    pub page_info: PageInfo,
}
