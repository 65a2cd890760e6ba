/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - tokens: TokenService (issue / verify)
 *   - users: UserLookup (Postgres 実装 or テスト用)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::{fmt, sync::Arc};

use crate::services::auth::{AccessGate, Role, TokenService, UserLookup};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserLookup>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserLookup>) -> Self {
        Self { tokens, users }
    }

    /// A gate over this state's token service and user store.
    pub fn gate(&self, required: Role) -> AccessGate {
        AccessGate::new(self.tokens.clone(), self.users.clone(), required)
    }
}
