//! HS256 bearer token issuance and verification.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::AuthError;
use super::principal::Principal;
use crate::accounts::domain::{Role, User, UserId};
use crate::config::AuthConfig;

/// Claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account id.
    pub sub: String,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies tokens with a shared secret. No I/O.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
    issuer: String,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration, issuer: impl Into<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
            issuer: issuer.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl,
            config.issuer.clone(),
        )
    }

    pub fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        self.issue_at(user.id, user.role, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        subject: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let iat = now.timestamp();
        let exp = iat.saturating_add(self.ttl_secs);
        let claims = TokenClaims {
            sub: subject.to_string(),
            role,
            iss: self.issuer.clone(),
            iat,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AuthError::Signing(err.to_string()))?;
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature, issuer and expiry, then map the claims to a principal.
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss"]);
        validation.leeway = 0;

        let claims = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(err.to_string()),
            })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map(UserId)
            .map_err(|err| AuthError::InvalidToken(format!("subject is not an id: {err}")))?;

        Ok(Principal {
            user_id,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::from_secs(3600), "travel-desk-test")
    }

    #[test]
    fn issued_token_verifies_to_principal() {
        let tokens = service();
        let subject = UserId::generate();
        let issued = tokens
            .issue_at(subject, Role::Admin, Utc::now())
            .expect("token issues");

        let principal = tokens.verify(&issued.token).expect("token verifies");
        assert_eq!(principal.user_id, subject);
        assert_eq!(principal.role, Role::Admin);
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);
        let issued = tokens
            .issue_at(UserId::generate(), Role::User, two_hours_ago)
            .expect("token issues");

        assert_eq!(tokens.verify(&issued.token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = TokenService::new(b"other-secret", Duration::from_secs(3600), "travel-desk-test");
        let issued = other
            .issue_at(UserId::generate(), Role::Admin, Utc::now())
            .expect("token issues");

        assert!(matches!(
            service().verify(&issued.token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn token_from_other_issuer_is_invalid() {
        let foreign = TokenService::new(b"test-secret", Duration::from_secs(3600), "someone-else");
        let issued = foreign
            .issue_at(UserId::generate(), Role::User, Utc::now())
            .expect("token issues");

        assert!(matches!(
            service().verify(&issued.token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            service().verify("not.a.token"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
