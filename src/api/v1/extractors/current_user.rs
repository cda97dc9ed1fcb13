use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{AccessDenied, user::User};
use crate::state::AppState;

use super::AuthCtx;

/// Lazily resolved user behind `oauth_user_id`.
///
/// Resolution only happens for handlers that ask for it. `None` when the
/// token has no (or a blank) subject, or the resolver does not know it.
pub struct CurrentUser(pub Option<User>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthCtx>()
            .ok_or_else(AccessDenied::missing_header)?;

        let Some(subject) = ctx.user_id.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(Self(None));
        };

        Ok(Self(state.users.resolve(subject).await?))
    }
}
