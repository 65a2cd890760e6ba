/*
 * Responsibility
 * - POST /tokens (role: admin)
 * - 対象ユーザーの存在確認 → credential 発行
 * - 発行できない場合 (secret 不備など) は ConfigurationError → 500
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::tokens::{IssueTokenRequest, TokenResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    state::AppState,
};

pub async fn issue_token(
    State(state): State<AppState>,
    AuthCtxExtractor(admin): AuthCtxExtractor,
    Json(req): Json<IssueTokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_USER_ID", msg))?;

    let target = state
        .users
        .find_by_id(req.user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    let access_token = state.tokens.issue(target.id)?;

    tracing::info!(
        issued_by = %admin.user_id,
        user_id = %target.id,
        role = %target.role,
        "credential issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            access_token,
            token_type: "Bearer",
            expires_in: state.tokens.lifetime().num_seconds(),
        }),
    ))
}
