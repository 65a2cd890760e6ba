/*
 * Responsibility
 * - The identity a credential resolves to (id / username / role)
 * - The lookup interface the gate uses to load it (UserLookup)
 * - Storage lives behind the trait (repos::user_repo for Postgres)
 */
use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repos::error::RepoError;

pub type UserId = i64;

/// Closed set of roles. Compared by exact equality; there is no hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A stored user record, read-only from the point of view of auth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

/// Resolves a credential subject to its backing user record.
///
/// - `Ok(None)`: no such user (e.g. deleted after the credential was issued)
/// - `Err(_)`: storage failure
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, RepoError>;
}
