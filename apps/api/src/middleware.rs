use admiral_core::{AppError, VerifiedClaims};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use serde_json::Value;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the claims verified by the upstream gateway.
pub const VERIFIED_CLAIMS_HEADER: &str = "x-verified-claims";

/// Resolves the requester from gateway-verified claims.
///
/// Inserts both the raw [`VerifiedClaims`] and the normalized
/// `RequesterContext` as request extensions. `OPTIONS` requests pass through.
pub async fn require_verified_claims(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let claims = verified_claims(request.headers())?;
    let requester = state.role_resolver.normalize(&claims);

    request.extensions_mut().insert(requester);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn verified_claims(headers: &HeaderMap) -> Result<VerifiedClaims, AppError> {
    let unauthorized = || AppError::Unauthorized("verified claims are required".to_owned());

    let encoded = headers
        .get(VERIFIED_CLAIMS_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(unauthorized)?;

    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .or_else(|_| URL_SAFE.decode(encoded))
        .map_err(|_| unauthorized())?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value @ Value::Object(_)) => Ok(VerifiedClaims::from_value(value)),
        _ => Err(unauthorized()),
    }
}
