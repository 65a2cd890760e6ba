//! Role-gated access to a protected operation.
//!
//! Per invocation: extract → verify → resolve → authorize, then either run the
//! operation or return an `AccessDenied` without running it. Nothing here is
//! cached or locked between requests; the only await point is the user lookup.

use std::{fmt, future::Future, sync::Arc};

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::services::auth::identity::{Identity, Role, UserId, UserLookup};
use crate::services::auth::token_service::{TokenError, TokenService};

const BEARER_SCHEME: &str = "Bearer";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// No usable `Authorization: Bearer <token>` header.
    #[error("credential missing")]
    CredentialMissing,
    #[error("credential invalid: {0}")]
    CredentialInvalid(TokenError),
    /// The credential is valid but its subject no longer exists.
    #[error("identity {0} not found")]
    IdentityNotFound(UserId),
    /// The user store failed; retryable.
    #[error("identity lookup failed")]
    IdentityLookupFailed,
    #[error("{required} role required")]
    InsufficientRole { required: Role, actual: Role },
}

impl AccessDenied {
    /// Machine-distinguishable reason code for clients.
    pub fn reason(&self) -> &'static str {
        match self {
            AccessDenied::CredentialMissing => "credential_missing",
            AccessDenied::CredentialInvalid(TokenError::Malformed) => "credential_malformed",
            AccessDenied::CredentialInvalid(TokenError::SignatureInvalid) => {
                "credential_signature_invalid"
            }
            AccessDenied::CredentialInvalid(TokenError::Expired) => "credential_expired",
            AccessDenied::IdentityNotFound(_) => "identity_not_found",
            AccessDenied::IdentityLookupFailed => "identity_lookup_failed",
            AccessDenied::InsufficientRole { .. } => "insufficient_role",
        }
    }
}

/// Outcome of a failed `AccessGate::guard` call.
#[derive(Debug, PartialEq, Eq)]
pub enum Guarded<E> {
    /// The gate rejected the request; the operation never ran.
    Denied(AccessDenied),
    /// The operation ran and failed with its own error, passed through as-is.
    Operation(E),
}

impl<E: fmt::Display> fmt::Display for Guarded<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guarded::Denied(denied) => write!(f, "access denied: {denied}"),
            Guarded::Operation(e) => e.fmt(f),
        }
    }
}

impl<E> std::error::Error for Guarded<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Guarded::Denied(denied) => Some(denied),
            Guarded::Operation(e) => e.source(),
        }
    }
}

/// Enforcement point: valid credential AND identity has `required` role.
#[derive(Clone)]
pub struct AccessGate {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserLookup>,
    required: Role,
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("required", &self.required)
            .finish()
    }
}

impl AccessGate {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserLookup>, required: Role) -> Self {
        Self {
            tokens,
            users,
            required,
        }
    }

    pub fn required_role(&self) -> Role {
        self.required
    }

    /// Decide access for a raw `Authorization` header value.
    pub async fn authorize(&self, authorization: Option<&str>) -> Result<Identity, AccessDenied> {
        let token = extract_bearer(authorization).inspect_err(|_| {
            debug!(required = %self.required, "no bearer credential presented");
        })?;

        let user_id = self.tokens.verify(token).map_err(|reason| {
            warn!(reason = reason.reason(), "credential verification failed");
            AccessDenied::CredentialInvalid(reason)
        })?;

        let identity = match self.users.find_by_id(user_id).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                warn!(user_id = %user_id, "credential subject has no user record");
                return Err(AccessDenied::IdentityNotFound(user_id));
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "user lookup failed");
                return Err(AccessDenied::IdentityLookupFailed);
            }
        };

        if identity.role != self.required {
            warn!(
                user_id = %user_id,
                required = %self.required,
                actual = %identity.role,
                "insufficient role"
            );
            return Err(AccessDenied::InsufficientRole {
                required: self.required,
                actual: identity.role,
            });
        }

        debug!(user_id = %user_id, role = %identity.role, "access granted");
        Ok(identity)
    }

    /// Run `operation` only if access is granted.
    ///
    /// The operation's own error comes back as `Guarded::Operation`, untouched.
    pub async fn guard<F, Fut, T, E>(
        &self,
        authorization: Option<&str>,
        operation: F,
    ) -> Result<T, Guarded<E>>
    where
        F: FnOnce(Identity) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let identity = self
            .authorize(authorization)
            .await
            .map_err(Guarded::Denied)?;

        operation(identity).await.map_err(Guarded::Operation)
    }
}

/// `"<scheme> <token>"` → token. Anything else counts as no credential.
fn extract_bearer(header: Option<&str>) -> Result<&str, AccessDenied> {
    let value = header.ok_or(AccessDenied::CredentialMissing)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AccessDenied::CredentialMissing)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AccessDenied::CredentialMissing);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AccessDenied::CredentialMissing);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::RwLock;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use crate::repos::error::RepoError;
    use crate::services::auth::clock::FixedClock;

    const SECRET: &[u8] = b"gate-test-secret-key-long-enough-for-hs256";

    #[derive(Default)]
    struct MemoryUsers {
        users: RwLock<HashMap<UserId, Identity>>,
        broken: AtomicBool,
    }

    impl MemoryUsers {
        fn with(identities: Vec<Identity>) -> Self {
            let users = identities.into_iter().map(|i| (i.id, i)).collect();
            Self {
                users: RwLock::new(users),
                broken: AtomicBool::new(false),
            }
        }

        fn remove(&self, id: UserId) {
            self.users.write().unwrap().remove(&id);
        }
    }

    #[async_trait]
    impl UserLookup for MemoryUsers {
        async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, RepoError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
            }
            Ok(self.users.read().unwrap().get(&id).cloned())
        }
    }

    fn identity(id: UserId, role: Role) -> Identity {
        Identity {
            id,
            username: format!("user{id}"),
            role,
        }
    }

    struct Fixture {
        tokens: Arc<TokenService>,
        users: Arc<MemoryUsers>,
    }

    impl Fixture {
        fn new() -> Self {
            let tokens = Arc::new(TokenService::new(SECRET, Duration::hours(24)).unwrap());
            let users = Arc::new(MemoryUsers::with(vec![
                identity(1, Role::Admin),
                identity(2, Role::User),
            ]));
            Self { tokens, users }
        }

        fn gate(&self, required: Role) -> AccessGate {
            AccessGate::new(self.tokens.clone(), self.users.clone(), required)
        }

        fn bearer(&self, id: UserId) -> String {
            format!("Bearer {}", self.tokens.issue(id).unwrap())
        }
    }

    #[test]
    fn extract_accepts_bearer_scheme_case_insensitively() {
        assert_eq!(extract_bearer(Some("Bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer(Some("bearer abc")), Ok("abc"));
    }

    #[test]
    fn extract_rejects_missing_or_empty_token() {
        for header in [None, Some(""), Some("Bearer"), Some("Bearer "), Some("Basic abc")] {
            assert_eq!(
                extract_bearer(header),
                Err(AccessDenied::CredentialMissing),
                "header {header:?}"
            );
        }
    }

    #[tokio::test]
    async fn admin_gate_grants_admin() {
        let fx = Fixture::new();
        let header = fx.bearer(1);

        let identity = fx.gate(Role::Admin).authorize(Some(header.as_str())).await.unwrap();
        assert_eq!(identity.id, 1);
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn admin_gate_denies_user_role() {
        let fx = Fixture::new();
        let header = fx.bearer(2);

        let denied = fx.gate(Role::Admin).authorize(Some(header.as_str())).await.unwrap_err();
        assert_eq!(
            denied,
            AccessDenied::InsufficientRole {
                required: Role::Admin,
                actual: Role::User,
            }
        );
        assert_eq!(denied.reason(), "insufficient_role");
    }

    #[tokio::test]
    async fn user_gate_does_not_admit_admin() {
        let fx = Fixture::new();
        let header = fx.bearer(1);

        let denied = fx.gate(Role::User).authorize(Some(header.as_str())).await.unwrap_err();
        assert!(matches!(denied, AccessDenied::InsufficientRole { .. }));
    }

    #[tokio::test]
    async fn missing_header_is_credential_missing() {
        let fx = Fixture::new();

        let denied = fx.gate(Role::User).authorize(None).await.unwrap_err();
        assert_eq!(denied, AccessDenied::CredentialMissing);

        let denied = fx.gate(Role::User).authorize(Some("Bearer")).await.unwrap_err();
        assert_eq!(denied, AccessDenied::CredentialMissing);
    }

    #[tokio::test]
    async fn invalid_credentials_carry_sub_reason() {
        let fx = Fixture::new();

        let denied = fx
            .gate(Role::User)
            .authorize(Some("Bearer garbage"))
            .await
            .unwrap_err();
        assert_eq!(denied, AccessDenied::CredentialInvalid(TokenError::Malformed));
        assert_eq!(denied.reason(), "credential_malformed");

        let past = Utc::now() - Duration::hours(25);
        let stale = TokenService::with_clock(SECRET, Duration::hours(24), Arc::new(FixedClock(past)))
            .unwrap()
            .issue(2)
            .unwrap();
        let denied = fx
            .gate(Role::User)
            .authorize(Some(format!("Bearer {stale}").as_str()))
            .await
            .unwrap_err();
        assert_eq!(denied, AccessDenied::CredentialInvalid(TokenError::Expired));
        assert_eq!(denied.reason(), "credential_expired");
    }

    #[tokio::test]
    async fn deleted_identity_is_not_found() {
        let fx = Fixture::new();
        let header = fx.bearer(2);
        fx.users.remove(2);

        let denied = fx.gate(Role::User).authorize(Some(header.as_str())).await.unwrap_err();
        assert_eq!(denied, AccessDenied::IdentityNotFound(2));
    }

    #[tokio::test]
    async fn storage_failure_is_lookup_failed() {
        let fx = Fixture::new();
        let header = fx.bearer(2);
        fx.users.broken.store(true, Ordering::SeqCst);

        let denied = fx.gate(Role::User).authorize(Some(header.as_str())).await.unwrap_err();
        assert_eq!(denied, AccessDenied::IdentityLookupFailed);
    }

    #[tokio::test]
    async fn guard_skips_operation_when_denied() {
        let fx = Fixture::new();
        let header = fx.bearer(2);
        let ran = AtomicBool::new(false);

        let result: Result<(), Guarded<std::io::Error>> = fx
            .gate(Role::Admin)
            .guard(Some(header.as_str()), |_| async {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(Guarded::Denied(AccessDenied::InsufficientRole { .. }))
        ));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn guard_passes_operation_result_through() {
        let fx = Fixture::new();
        let header = fx.bearer(1);
        let gate = fx.gate(Role::Admin);

        let ok: Result<String, Guarded<String>> = gate
            .guard(Some(header.as_str()), |identity| async move { Ok(identity.username) })
            .await;
        assert_eq!(ok, Ok("user1".to_string()));

        let err: Result<(), Guarded<String>> = gate
            .guard(Some(header.as_str()), |_| async { Err("downstream".to_string()) })
            .await;
        assert_eq!(err, Err(Guarded::Operation("downstream".to_string())));
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let fx = Fixture::new();
        let gate = fx.gate(Role::User);
        let header = Arc::new(fx.bearer(2));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let gate = gate.clone();
                let header = header.clone();
                tokio::spawn(async move { gate.authorize(Some(header.as_str())).await.map(|i| i.id) })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(2));
        }
    }
}
