use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::{accounts::Account, config::JwtConfig, state::AppState};

/// Why a presented token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("missing Authorization header")]
    Missing,
    #[error("malformed bearer token")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token issuer or audience is not accepted")]
    InvalidClaims,
}

impl TokenError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing => "TOKEN_MISSING",
            Self::Malformed => "TOKEN_MALFORMED",
            Self::BadSignature => "TOKEN_BAD_SIGNATURE",
            Self::Expired => "TOKEN_EXPIRED",
            Self::InvalidClaims => "TOKEN_INVALID_CLAIMS",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::InvalidClaims,
            _ => Self::Malformed,
        }
    }
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::seconds(cfg.ttl_minutes.saturating_mul(60)),
        }
    }

    /// Mint an access token for `account`, valid for the configured TTL.
    pub fn issue(&self, account: &Account) -> anyhow::Result<String> {
        self.issue_at(account, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, account: &Account, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = now
            .checked_add(self.ttl)
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(account_id = %account.id, "jwt signed");
        Ok(token)
    }

    /// Check signature, expiry, issuer and audience, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Malformed);
        }
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            let reason = TokenError::from(e);
            debug!(reason = reason.code(), "jwt rejected");
            reason
        })?;
        debug!(account_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenValidation;
    use uuid::Uuid;

    fn make_config(secret: &str, issuer: &str, audience: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
            validation: TokenValidation::Verify,
        }
    }

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&make_config(secret, issuer, audience))
    }

    fn account() -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "unused".into(),
            full_name: "A".into(),
            created_at: OffsetDateTime::now_utc(),
            last_login_at: None,
            is_active: true,
        }
    }

    #[test]
    fn issue_and_verify_carries_identity_claims() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let account = account();
        let token = keys.issue(&account).expect("issue");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.full_name, "A");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let keys = make_keys("secret-one", "iss", "aud");
        let other = make_keys("secret-two", "iss", "aud");
        let token = keys.issue(&account()).unwrap();
        assert_eq!(other.verify(&token).unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let issued = OffsetDateTime::now_utc() - Duration::hours(2);
        let token = keys.issue_at(&account(), issued).unwrap();
        assert_eq!(keys.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn issue_with_unrepresentable_expiry_errors_instead_of_panicking() {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: 1_000_000_000_000,
            validation: TokenValidation::Verify,
        });
        let err = keys.issue(&account()).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let keys = JwtKeys::from_config(&JwtConfig {
            ttl_minutes: i64::MAX,
            ..make_config("dev-secret", "iss", "aud")
        });
        assert!(keys.issue(&account()).is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.issue(&account()).unwrap();
        assert_eq!(bad.verify(&token).unwrap_err(), TokenError::InvalidClaims);
    }

    #[test]
    fn verify_rejects_garbage_and_empty() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert_eq!(keys.verify("not.a.jwt").unwrap_err(), TokenError::Malformed);
        assert_eq!(keys.verify("garbage").unwrap_err(), TokenError::Malformed);
        assert_eq!(keys.verify("").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(&account()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = keys.issue(&account()).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;
        let spliced = parts.join(".");
        assert_eq!(keys.verify(&spliced).unwrap_err(), TokenError::BadSignature);
    }
}
