//! Admin authentication
//!
//! Admin routes are guarded by a shared token in the `X-Admin-Token` header,
//! compared in constant time. An unset token disables the admin surface
//! entirely rather than leaving it open.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::core::ServerState;
use crate::utils::AppError;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Route-layer middleware for the admin router.
pub async fn require_admin(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state.config.admin_token.as_str();
    if expected.is_empty() {
        tracing::warn!("Admin request rejected: ADMIN_TOKEN not configured");
        return Err(AppError::Unauthorized);
    }

    let provided = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if ring::constant_time::verify_slices_are_equal(expected.as_bytes(), provided.as_bytes())
        .is_err()
    {
        tracing::warn!("Admin request rejected: token mismatch");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
