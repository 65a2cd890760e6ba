/*
 * Responsibility
 * - users テーブル向け SQLx 操作 (読み取りのみ)
 * - UserLookup の Postgres 実装
 * - role 文字列は Role に昇格させ、未知の値は RepoError::InvalidRow にする
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;
use crate::services::auth::identity::{Identity, Role, UserId, UserLookup};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub role: String,
}

impl TryFrom<UserRow> for Identity {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepoError::InvalidRow(format!("user {}: {}", row.id, e)))?;

        Ok(Identity {
            id: row.id,
            username: row.username,
            role,
        })
    }
}

pub async fn get(db: &PgPool, user_id: UserId) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, role
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Postgres-backed user lookup. Cheap to clone (PgPool is an Arc inside).
#[derive(Clone, Debug)]
pub struct UserRepo {
    db: PgPool,
}

impl UserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserLookup for UserRepo {
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, RepoError> {
        get(&self.db, id).await?.map(Identity::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_known_role_converts() {
        let row = UserRow {
            id: 3,
            username: "maria".to_string(),
            role: "admin".to_string(),
        };

        let identity = Identity::try_from(row).unwrap();
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.username, "maria");
    }

    #[test]
    fn row_with_unknown_role_is_invalid() {
        let row = UserRow {
            id: 4,
            username: "ops".to_string(),
            role: "superuser".to_string(),
        };

        let err = Identity::try_from(row).unwrap_err();
        assert!(matches!(err, RepoError::InvalidRow(msg) if msg.contains("superuser")));
    }
}
