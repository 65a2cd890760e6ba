/*
 * Responsibility
 * - POST /tokens の request/response DTO
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::UserId;

#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    pub user_id: UserId,
}

impl IssueTokenRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.user_id <= 0 {
            return Err("user_id must be a positive integer");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: i64,
}
