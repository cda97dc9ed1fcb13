use serde::Serialize;

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::user::User;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub attributes: AuthCtx,
    pub user: Option<User>,
}
