use std::{fmt, sync::Arc};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::services::auth::claims::Claims;
use crate::services::auth::clock::{Clock, SystemClock};
use crate::services::auth::identity::UserId;

/// Secrets shorter than this still work but are logged at startup.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Why a presented credential was rejected.
///
/// The variants drive different client remediation and must stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Cannot be parsed into claims + signature (or uses an unexpected algorithm).
    #[error("malformed credential")]
    Malformed,
    /// Parses, but the signature does not match the claims.
    #[error("credential signature mismatch")]
    SignatureInvalid,
    /// Signature is valid but `now >= exp`.
    #[error("credential expired")]
    Expired,
}

impl TokenError {
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::Expired => "expired",
        }
    }
}

/// The token service cannot sign credentials (missing secret, bad lifetime,
/// signer failure). Fatal: protected routes cannot be served safely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token service misconfigured: {0}")]
pub struct ConfigurationError(pub String);

/// Issues and verifies HS256-signed, time-bounded credentials.
///
/// Holds only immutable key material, the lifetime, and a clock, so one
/// instance is shared (via `Arc`) by every concurrent request.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("lifetime_seconds", &self.lifetime.num_seconds())
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, ConfigurationError> {
        Self::with_clock(secret, lifetime, Arc::new(SystemClock))
    }

    pub fn with_clock(
        secret: &[u8],
        lifetime: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigurationError> {
        if secret.is_empty() {
            return Err(ConfigurationError("signing secret is empty".to_string()));
        }
        if lifetime <= Duration::zero() {
            return Err(ConfigurationError(format!(
                "token lifetime must be positive (got {}s)",
                lifetime.num_seconds()
            )));
        }
        if secret.len() < RECOMMENDED_SECRET_LEN {
            warn!(
                secret_len = secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "signing secret is shorter than recommended"
            );
        }

        // Expiry is checked by hand against the injected clock: jsonwebtoken's
        // own check accepts `now == exp` and always reads the system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
            clock,
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a credential for `user_id`, valid for `lifetime` from now.
    pub fn issue(&self, user_id: UserId) -> Result<String, ConfigurationError> {
        let now = self.clock.now();
        let expires_at = now.checked_add_signed(self.lifetime).ok_or_else(|| {
            ConfigurationError(format!("expiry out of range for issue time {now}"))
        })?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                error!(user_id = %user_id, error = %e, "failed to sign credential");
                ConfigurationError(format!("signing failed: {e}"))
            })?;

        debug!(user_id = %user_id, expires_at = claims.exp, "issued credential");
        Ok(token)
    }

    /// Verify a credential and return its subject.
    ///
    /// Order: structure/algorithm → signature → expiry (`now >= exp` is expired).
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(token, e.kind()))?;
        let claims = data.claims;

        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Malformed)?;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(user_id)
    }
}

fn classify(token: &str, kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        // header + claims are intact, only the signature segment is unreadable
        _ if signing_input_is_intact(token) => TokenError::SignatureInvalid,
        // bad segments / base64 / json / utf8, unexpected alg, missing claims
        _ => TokenError::Malformed,
    }
}

/// Everything after the second `.` counts as the signature segment.
fn signing_input_is_intact(token: &str) -> bool {
    let mut parts = token.splitn(3, '.');
    let (Some(header), Some(payload), Some(_signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let header_ok = URL_SAFE_NO_PAD
        .decode(header)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Header>(&bytes).ok())
        .is_some_and(|h| h.alg == Algorithm::HS256);

    header_ok
        && URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Claims>(&bytes).ok())
            .is_some()
}
