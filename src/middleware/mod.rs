/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: AccessGate を route の前段に置く
 * - http: request-id / trace / body limit / timeout
 */
pub mod auth;
pub mod http;
