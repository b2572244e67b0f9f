//! Request identity: who is calling.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use common::PrincipalId;

use crate::state::AppState;

/// Supplies the authenticated principal for a request, if any.
pub trait IdentityProvider: Send + Sync {
    fn principal(&self, headers: &HeaderMap) -> Option<PrincipalId>;
}

/// Treats the bearer token of the `Authorization` header as an opaque
/// session principal.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerSessionIdentity;

impl IdentityProvider for BearerSessionIdentity {
    fn principal(&self, headers: &HeaderMap) -> Option<PrincipalId> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?.trim();
        (!token.is_empty()).then(|| PrincipalId::new(token))
    }
}

/// Extractor yielding the principal resolved by the configured provider.
///
/// Never rejects; handlers decide what an absent principal means.
pub struct CurrentPrincipal(pub Option<PrincipalId>);

impl FromRequestParts<Arc<AppState>> for CurrentPrincipal {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentPrincipal(state.identity.principal(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_is_principal() {
        let principal = BearerSessionIdentity.principal(&headers_with("Bearer session-123"));
        assert_eq!(principal, Some(PrincipalId::new("session-123")));
    }

    #[test]
    fn test_missing_or_malformed_header() {
        assert!(BearerSessionIdentity.principal(&HeaderMap::new()).is_none());
        assert!(
            BearerSessionIdentity
                .principal(&headers_with("Basic dXNlcjpwYXNz"))
                .is_none()
        );
        assert!(
            BearerSessionIdentity
                .principal(&headers_with("Bearer   "))
                .is_none()
        );
    }
}
