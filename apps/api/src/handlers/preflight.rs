use axum::Json;

use crate::dto::DataEnvelope;

/// Answers `OPTIONS` on admin routes.
pub async fn preflight_handler() -> Json<DataEnvelope<&'static str>> {
    Json(DataEnvelope::new("ok"))
}
