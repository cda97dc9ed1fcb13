/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は public, /me と /token/revoke は bearer gate の内側
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{health::health, me::me, token::revoke_current};
use crate::middleware::auth::{BearerAuth, access};
use crate::state::AppState;

pub fn routes(auth: BearerAuth) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/token/revoke", post(revoke_current));

    Router::new()
        .route("/health", get(health))
        .merge(access::apply(protected, auth))
}
