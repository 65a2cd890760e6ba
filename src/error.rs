/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - AccessDenied / ConfigurationError / RepoError を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::{AccessDenied, ConfigurationError, TokenError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error(transparent)]
    Denied(#[from] AccessDenied),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

fn denied_status(denied: &AccessDenied) -> StatusCode {
    match denied {
        // storage trouble is on our side and worth retrying
        AccessDenied::IdentityLookupFailed => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::FORBIDDEN,
    }
}

// The account may have been deleted after issuance, so a missing identity reads
// like any other invalid credential to the client; only the code differs.
fn denied_message(denied: &AccessDenied) -> String {
    match denied {
        AccessDenied::CredentialMissing => "Token is missing.".into(),
        AccessDenied::CredentialInvalid(TokenError::Expired) => {
            "Token expired. Please log in again.".into()
        }
        AccessDenied::CredentialInvalid(_) | AccessDenied::IdentityNotFound(_) => {
            "Invalid token. Please log in again.".into()
        }
        AccessDenied::IdentityLookupFailed => {
            "Could not verify access right now. Please retry.".into()
        }
        AccessDenied::InsufficientRole { required, .. } => {
            format!("Access denied. {required} role required.")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{resource} not found."),
            ),
            AppError::Denied(denied) => (
                denied_status(&denied),
                denied.reason(),
                denied_message(&denied),
            ),
            AppError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                "internal server error".into(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        tracing::error!(error = %e, "repository error");
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::services::auth::Role;

    #[test]
    fn lookup_failure_is_retryable_5xx() {
        let res = AppError::from(AccessDenied::IdentityLookupFailed).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn every_other_denial_is_forbidden() {
        let denials = [
            AccessDenied::CredentialMissing,
            AccessDenied::CredentialInvalid(TokenError::Malformed),
            AccessDenied::CredentialInvalid(TokenError::SignatureInvalid),
            AccessDenied::CredentialInvalid(TokenError::Expired),
            AccessDenied::IdentityNotFound(9),
            AccessDenied::InsufficientRole {
                required: Role::Admin,
                actual: Role::User,
            },
        ];

        for denied in denials {
            let res = AppError::from(denied.clone()).into_response();
            assert_eq!(res.status(), StatusCode::FORBIDDEN, "{denied:?}");
        }
    }

    #[test]
    fn insufficient_role_message_names_only_required_role() {
        let msg = denied_message(&AccessDenied::InsufficientRole {
            required: Role::Admin,
            actual: Role::User,
        });
        assert_eq!(msg, "Access denied. admin role required.");
        assert!(!msg.contains("user"));
    }
}
