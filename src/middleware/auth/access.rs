//! Bearer credential 検証 + role check → AuthCtx を extensions に入れる
//!
//! AccessGate を axum の middleware として route の前段に置く。
//! - 拒否時は handler を呼ばずに AppError (403 / 503) を返す
//! - 許可時は handler の Response をそのまま返す (書き換えない)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AccessGate, Role};
use crate::state::AppState;

/// `router` 配下の全 route に `required` role を要求する。
///
/// 例：
/// ```ignore
/// let admin = Router::new().route("/tokens", post(issue_token));
/// let admin = middleware::auth::access::require_role(admin, &state, Role::Admin);
/// ```
pub fn require_role(router: Router<AppState>, state: &AppState, required: Role) -> Router<AppState> {
    // route_layer: 該当 route が無い場合は 404 のまま (gate を通さない)
    router.route_layer(middleware::from_fn_with_state(
        state.gate(required),
        access_middleware,
    ))
}

async fn access_middleware(
    State(gate): State<AccessGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 非 ASCII などで文字列化できないヘッダは「無い」扱い (CredentialMissing)
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = gate.authorize(authorization).await?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from(identity));

    Ok(next.run(req).await)
}
