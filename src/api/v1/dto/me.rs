use serde::Serialize;

use crate::services::auth::{Role, UserId};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}
