/*
 * Responsibility
 * - Handler から見える「認証・認可済みコンテキスト」の型
 * - middleware (AccessGate) が検証して request extensions に格納し、handler はこの型だけを受け取る
 */
use crate::services::auth::{Identity, Role, UserId};

/// 認可済みのリクエストに付与されるコンテキスト
///
/// - `role` は gate が要求した role と一致済み
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl From<Identity> for AuthCtx {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.id,
            username: identity.username,
            role: identity.role,
        }
    }
}
