/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - revocation: RevocationChecker, users: UserResolver
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::{RevocationChecker, user::UserResolver};

#[derive(Clone)]
pub struct AppState {
    pub revocation: Arc<dyn RevocationChecker>,
    pub users: Arc<dyn UserResolver>,
}

impl AppState {
    pub fn new(revocation: Arc<dyn RevocationChecker>, users: Arc<dyn UserResolver>) -> Self {
        Self { revocation, users }
    }
}
