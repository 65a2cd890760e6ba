/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, JWT secret, timeout など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動後は不変 (Config は TokenService などに値で渡す)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;

/// Credential lifetime. Fixed; not read from the environment.
pub const TOKEN_LIFETIME_SECONDS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,

    pub jwt_secret: String,
    pub token_lifetime: Duration,

    pub request_timeout_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret or credentials embedded in the database url
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database_max_connections", &self.database_max_connections)
            .field("token_lifetime_seconds", &self.token_lifetime.num_seconds())
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_process_env()
    }

    fn from_process_env() -> Result<Self, ConfigError> {
        let port: u16 = positive_or("PORT", 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections: u32 = positive_or("DATABASE_MAX_CONNECTIONS", 5)?;

        let jwt_secret = secret_from_env()?;

        // 0 would time out every request immediately
        let request_timeout_seconds: u64 = positive_or("REQUEST_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            jwt_secret,
            token_lifetime: Duration::seconds(TOKEN_LIFETIME_SECONDS),
            request_timeout_seconds,
        })
    }
}

/// Unset → `default`. Set → must parse and be > 0.
fn positive_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .ok()
            .filter(|n| *n > T::default())
            .ok_or(ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// `JWT_SECRET`, falling back to `SECRET_KEY`. Empty values count as missing.
pub fn secret_from_env() -> Result<String, ConfigError> {
    ["JWT_SECRET", "SECRET_KEY"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing("JWT_SECRET"))
}
