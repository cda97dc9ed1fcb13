/*
 * Responsibility
 * - POST /token/revoke: 提示された access token 自身の jti を revoke する (logout)
 * - entry は token の exp まで保持する (exp が無ければ設定の TTL)
 * - 以降、同じ token は bearer gate で "Access token has been revoked" になる
 */
use axum::{extract::State, http::StatusCode};

use crate::{api::v1::extractors::AuthCtxExtractor, error::AppError, state::AppState};

pub async fn revoke_current(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<StatusCode, AppError> {
    state
        .revocation
        .revoke_until(&ctx.access_token_id, ctx.expires_at)
        .await?;

    tracing::info!(jti = %ctx.access_token_id, "access token revoked by its holder");
    Ok(StatusCode::NO_CONTENT)
}
