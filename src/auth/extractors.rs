use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{
    claims::Claims,
    jwt::{JwtKeys, TokenError},
};
use crate::error::ApiError;

/// Raw token from `Authorization: Bearer <token>`. Only checks that the header
/// is there, uses the Bearer scheme and carries a non-empty token.
#[derive(Debug)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(TokenError::Missing)?;

        let auth = header.to_str().map_err(|_| TokenError::Malformed)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("invalid auth scheme or empty bearer token");
                TokenError::Malformed
            })?;

        Ok(BearerToken(token.to_string()))
    }
}

/// Bearer token that passed signature, expiry, issuer and audience checks.
#[derive(Debug)]
pub struct Authenticated(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|reason| {
            warn!(reason = reason.code(), "bearer token rejected");
            reason
        })?;
        Ok(Authenticated(claims))
    }
}
