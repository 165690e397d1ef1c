use admiral_core::AppResult;
use admiral_domain::{AdminGroup, ContinuationToken, ListingPage, PageRequest};

use super::types::{AdminGroupListResponse, AdminGroupResponse, ListAdminGroupsQuery};

const DEFAULT_PER_PAGE: u32 = 10;

impl ListAdminGroupsQuery {
    pub fn page_request(&self) -> AppResult<PageRequest> {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(DEFAULT_PER_PAGE),
            self.continuation_token
                .clone()
                .and_then(ContinuationToken::new),
        )
    }
}

impl From<AdminGroup> for AdminGroupResponse {
    fn from(group: AdminGroup) -> Self {
        Self {
            id: group.name().to_owned(),
            group: group.name().to_owned(),
            creation_date: group.created_at().to_rfc3339(),
            description: group.description().map(ToOwned::to_owned),
            last_modified_date: group.last_modified_at().to_rfc3339(),
            precedence: group.precedence(),
        }
    }
}

impl From<ListingPage<AdminGroup>> for AdminGroupListResponse {
    fn from(page: ListingPage<AdminGroup>) -> Self {
        let data: Vec<AdminGroupResponse> = page
            .items
            .into_iter()
            .map(AdminGroupResponse::from)
            .collect();

        Self {
            total: data.len(),
            data,
            continuation_token: page.continuation_token.map(String::from),
        }
    }
}
