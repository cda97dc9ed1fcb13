/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジック / revocation は middleware/services 側の責務
 * - serialize 時は oauth_* の attribute 名を使う
 */
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::auth::{Audience, ClaimSet};

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `access_token_id` は token の `jti` (revocation key)
/// - `client_id` は `aud` (要素 1 つの配列は文字列に正規化済み)
/// - `user_id` は `sub`。無い場合はユーザー解決をしない
/// - `scopes` は token に付与された scope の一覧
/// - `expires_at` は `exp`。attributes には出さず、revoke の保持期間にだけ使う
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthCtx {
    #[serde(rename = "oauth_access_token_id")]
    pub access_token_id: String,
    #[serde(rename = "oauth_client_id")]
    pub client_id: Audience,
    #[serde(rename = "oauth_user_id")]
    pub user_id: Option<String>,
    #[serde(rename = "oauth_scopes")]
    pub scopes: Vec<String>,
    #[serde(skip)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ClaimSet> for AuthCtx {
    fn from(claims: ClaimSet) -> Self {
        let (access_token_id, client_id, user_id, scopes, expires_at) = claims.into_parts();
        Self {
            access_token_id,
            client_id,
            user_id,
            scopes,
            expires_at,
        }
    }
}
