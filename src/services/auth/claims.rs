use serde::{Deserialize, Serialize};

/// Credential claims.
///
/// - `sub` is the decimal form of the user id (JWT requires a string subject).
/// - `iat` / `exp` are unix seconds; `exp` is always `iat + lifetime`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}
