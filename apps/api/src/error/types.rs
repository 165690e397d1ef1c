use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    kind: &'static str,
    message: String,
}

impl ErrorResponse {
    pub(super) fn new(kind: &'static str, message: String) -> Self {
        Self { kind, message }
    }
}
