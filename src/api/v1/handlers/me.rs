/*
 * Responsibility
 * - GET /me (role: user)
 * - gate が解決した identity をそのまま返す (DB は再読込しない)
 */
use axum::Json;

use crate::api::v1::{dto::me::MeResponse, extractors::AuthCtxExtractor};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        id: ctx.user_id,
        username: ctx.username,
        role: ctx.role,
    })
}
