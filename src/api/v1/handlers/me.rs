/*
 * Responsibility
 * - GET /me: bearer gate が付けた oauth_* attributes と解決済みユーザーを返す
 */
use axum::Json;

use crate::api::v1::{
    dto::me::MeResponse,
    extractors::{AuthCtxExtractor, CurrentUser},
};

pub async fn me(
    AuthCtxExtractor(attributes): AuthCtxExtractor,
    CurrentUser(user): CurrentUser,
) -> Json<MeResponse> {
    Json(MeResponse { attributes, user })
}
