use admiral_core::{AppError, AppResult};
use admiral_domain::{AttributeFilter, ContinuationToken};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Keyset position carried inside a continuation token.
///
/// `scope` names the query that issued the cursor; a token is only accepted
/// by the same query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct KeysetCursor {
    #[serde(rename = "s")]
    scope: String,
    #[serde(rename = "k")]
    after: String,
}

impl KeysetCursor {
    pub(crate) fn new(scope: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            after: after.into(),
        }
    }

    pub(crate) fn encode(&self) -> AppResult<ContinuationToken> {
        let json = serde_json::to_vec(self).map_err(|error| {
            AppError::Internal(format!("failed to encode continuation token: {error}"))
        })?;

        ContinuationToken::new(URL_SAFE_NO_PAD.encode(json))
            .ok_or_else(|| AppError::Internal("encoded continuation token is empty".to_owned()))
    }

    /// Decodes a token issued for `scope`.
    pub(crate) fn decode(token: &ContinuationToken, scope: &str) -> AppResult<Self> {
        let invalid = || AppError::Validation("invalid continuation token".to_owned());

        let bytes = URL_SAFE_NO_PAD
            .decode(token.as_str())
            .map_err(|_| invalid())?;
        let cursor: Self = serde_json::from_slice(&bytes).map_err(|_| invalid())?;

        if cursor.scope != scope {
            return Err(AppError::Validation(
                "continuation token belongs to a different query".to_owned(),
            ));
        }

        Ok(cursor)
    }

    /// Decodes an optional token into the key to resume after.
    pub(crate) fn resume_after(
        token: Option<&ContinuationToken>,
        scope: &str,
    ) -> AppResult<Option<String>> {
        token
            .map(|token| Self::decode(token, scope).map(|cursor| cursor.after))
            .transpose()
    }
}

/// Scope of the group listing.
pub(crate) const GROUPS_SCOPE: &str = "groups";

/// Scope of a global account listing with an optional attribute filter.
pub(crate) fn accounts_scope(filter: Option<&AttributeFilter>) -> String {
    match filter {
        Some(filter) => format!("accounts:{}:{}", filter.attribute(), filter.prefix()),
        None => "accounts".to_owned(),
    }
}

/// Scope of a group member listing.
pub(crate) fn members_scope(group: &str) -> String {
    format!("members:{group}")
}
