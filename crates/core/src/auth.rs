use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims mapping produced by an already-verified identity token.
///
/// Token verification happens upstream. This type only carries the decoded
/// mapping so authorization code can read individual claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifiedClaims(Map<String, Value>);

impl VerifiedClaims {
    /// Wraps a decoded claims mapping.
    #[must_use]
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Builds claims from an arbitrary JSON value.
    ///
    /// Anything other than a JSON object yields an empty mapping.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(claims) => Self(claims),
            _ => Self::default(),
        }
    }

    /// Returns the raw value of one claim.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the `sub` claim, if present.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.claim("sub").and_then(Value::as_str)
    }

    /// Returns the `email` claim, if present.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.claim("email").and_then(Value::as_str)
    }

    /// Returns whether the mapping holds no claims at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
