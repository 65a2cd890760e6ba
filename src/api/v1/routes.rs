/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - どの route にどの role を要求するかをここで決める (route_layer)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth::require_role;
use crate::services::auth::Role;
use crate::state::AppState;

use crate::api::v1::handlers::{health::health, me::me, tokens::issue_token};

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/health", get(health));

    let users = require_role(Router::new().route("/me", get(me)), state, Role::User);

    let admin = require_role(
        Router::new().route("/tokens", post(issue_token)),
        state,
        Role::Admin,
    );

    public.merge(users).merge(admin)
}
