use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::claims::Claims;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;

/// Routes reachable without a token.
const EXEMPT_ROUTES: &[&str] = &["/auth/signup", "/auth/signin", "/health"];

pub fn is_exempt(path: &str) -> bool {
    EXEMPT_ROUTES.contains(&path)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Applied to the whole router. Exemption is checked before any token
/// inspection; on success the verified claims are attached to the request
/// for downstream extractors.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_exempt(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers()).ok_or_else(|| {
        ApiError::Unauthorized("Missing or invalid Authorization header".into())
    })?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(token).map_err(|e| {
        warn!(reason = %e, "token rejected");
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Pulls the claims attached by [`require_auth`] out of the request.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::Unauthorized("Missing authentication".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn signup_signin_and_health_are_exempt() {
        assert!(is_exempt("/auth/signup"));
        assert!(is_exempt("/auth/signin"));
        assert!(is_exempt("/health"));
    }

    #[test]
    fn everything_else_is_gated() {
        assert!(!is_exempt("/tasks"));
        assert!(!is_exempt("/tasks/550e8400-e29b-41d4-a716-446655440001"));
        assert!(!is_exempt("/auth/profile"));
        assert!(!is_exempt("/"));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes_and_absence() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(bearer_token(&headers), None);
    }
}
