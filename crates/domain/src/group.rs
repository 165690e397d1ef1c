use admiral_core::{AppResult, NonEmptyString};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::is_administrative_group;

/// Directory group. Its name doubles as the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminGroup {
    name: NonEmptyString,
    description: Option<String>,
    precedence: Option<i32>,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl AdminGroup {
    /// Creates a validated group.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        precedence: Option<i32>,
        created_at: DateTime<Utc>,
        last_modified_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            description,
            precedence,
            created_at,
            last_modified_at,
        })
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the free-text description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the numeric precedence.
    #[must_use]
    pub fn precedence(&self) -> Option<i32> {
        self.precedence
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    /// Returns whether the group is `SA`, `SPA` or a `TA_*` group.
    #[must_use]
    pub fn is_administrative(&self) -> bool {
        is_administrative_group(self.name())
    }
}
