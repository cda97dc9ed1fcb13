use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AccessDenied;

/// bearer gate が付けた oauth_* attributes を handler へ渡す extractor。
/// gate を通っていない route では attributes が無いので、gate と同じ 401 body を返す。
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S: Send + Sync> FromRequestParts<S> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthCtx>() {
            Some(ctx) => Ok(Self(ctx.clone())),
            None => Err(AccessDenied::missing_header().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn missing_attributes_yield_401() {
        let (mut parts, _) = Request::new(()).into_parts();

        let Err(rejection) = AuthCtxExtractor::from_request_parts(&mut parts, &()).await else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
