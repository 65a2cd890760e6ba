/// Factory: build `TokenService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::token_service::{ConfigurationError, TokenService};

pub fn build_token_service(config: &Config) -> Result<Arc<TokenService>, ConfigurationError> {
    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_lifetime)?;

    Ok(Arc::new(tokens))
}
