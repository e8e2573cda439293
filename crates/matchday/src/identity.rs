use std::future::Future;

use uuid::Uuid;

use crate::domain::Session;
use crate::error::ServiceError;

/// Resolves a caller credential to a user id.
///
/// Verifying the credential is the provider's business; this crate only asks
/// who is calling.
pub trait IdentityProvider {
    fn resolve_caller(&self, credential: &str) -> impl Future<Output = Option<Uuid>> + Send;
}

/// Strip an optional `Bearer ` prefix from an Authorization header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolve the caller or fail with `Unauthorized`.
pub async fn require_caller<I: IdentityProvider>(
    identity: &I,
    credential: Option<&str>,
) -> Result<Uuid, ServiceError> {
    let token = credential
        .and_then(bearer_token)
        .ok_or(ServiceError::Unauthorized)?;

    identity
        .resolve_caller(token)
        .await
        .ok_or(ServiceError::Unauthorized)
}

/// Only the session owner may assign, start or score.
pub fn require_owner(
    session: &Session,
    caller: Uuid,
    action: &'static str,
) -> Result<(), ServiceError> {
    if session.owner_id != caller {
        tracing::warn!(
            session = %session.code,
            caller = %caller,
            "Rejected non-owner attempt to {}",
            action
        );
        return Err(ServiceError::Forbidden(action));
    }
    Ok(())
}
