pub mod auth_ctx;
pub mod current_user;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use current_user::CurrentUser;
