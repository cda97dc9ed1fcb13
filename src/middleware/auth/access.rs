//! Bearer access-token gate → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を BearerTokenValidator で検証する
//!   (署名 + nbf/exp + revocation)。
//! - 成功時: ClaimSet を AuthCtx (oauth_* attributes) に変換して extensions に格納し、次の handler へ。
//! - 失敗時: 401 を返し、handler には一切到達させない。
//! - 設定されていれば required scopes (ALL / ANY) もここで確認する。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{
    AccessDenied, BearerTokenValidator, ScopeRequirement, error::MISSING_SCOPES,
};

/// Middleware state: the validator plus the scopes protected routes require.
#[derive(Clone, Debug)]
pub struct BearerAuth {
    validator: Arc<BearerTokenValidator>,
    scopes: ScopeRequirement,
}

impl BearerAuth {
    pub fn new(validator: Arc<BearerTokenValidator>) -> Self {
        Self {
            validator,
            scopes: ScopeRequirement::none(),
        }
    }

    pub fn require_scopes(mut self, scopes: ScopeRequirement) -> Self {
        self.scopes = scopes;
        self
    }
}

/// 保護したい Router に bearer 認証を掛ける。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/me", get(me));
/// let protected = middleware::auth::access::apply(protected, bearer_auth);
/// app = app.merge(protected);
/// ```
pub fn apply<S>(router: Router<S>, auth: BearerAuth) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // middleware 自身の state (BearerAuth) は Router の state と独立
    router.layer(middleware::from_fn_with_state(auth, access_middleware))
}

async fn access_middleware(
    State(auth): State<BearerAuth>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = match auth.validator.validate(req.headers()).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                reason = %err,
                cause = ?std::error::Error::source(&err).map(|s| s.to_string()),
                "access token rejected"
            );
            return Err(err.into());
        }
    };

    if !auth.scopes.is_satisfied_by(claims.scopes()) {
        tracing::warn!(
            jti = %claims.token_id(),
            granted = ?claims.scopes(),
            required = ?auth.scopes.required(),
            policy = ?auth.scopes.policy(),
            "access token lacks required scopes"
        );
        return Err(AccessDenied::new(MISSING_SCOPES).into());
    }

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from(claims));

    Ok(next.run(req).await)
}
