//! Stateless access tokens: HS256-signed, short-lived, subject = username.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Issues and verifies signed bearer tokens against a server-wide secret.
///
/// Tokens are not persisted; a token is valid until its expiry regardless of
/// server-side state. Resolution re-checks that the subject still exists, so
/// tokens of deleted users stop working at the resolver.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `subject` expiring after the configured TTL.
    ///
    /// # Errors
    /// Returns an error if claim serialization or signing fails.
    pub fn issue(&self, subject: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            exp: now + self.ttl_seconds,
            iat: now,
            jti: Ulid::new().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("failed to sign access token")
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// Returns an error when the token is malformed, the signature does not
    /// verify, or the expiry has passed. All three are distinct from "no
    /// token presented", which callers must handle before verification.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .context("invalid access token")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify() -> Result<()> {
        let signer = TokenSigner::new("test-secret", 1800);
        let token = signer.issue("alice")?;

        let claims = signer.verify(&token)?;
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 1800);
        assert!(!claims.jti.is_empty());
        Ok(())
    }

    #[test]
    fn wrong_secret_rejected() -> Result<()> {
        let signer = TokenSigner::new("secret-one", 1800);
        let other = TokenSigner::new("secret-two", 1800);

        let token = signer.issue("alice")?;
        assert!(other.verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn malformed_token_rejected() {
        let signer = TokenSigner::new("test-secret", 1800);
        assert!(signer.verify("not-a-token").is_err());
        assert!(signer.verify("").is_err());
    }

    #[test]
    fn expired_token_rejected() -> Result<()> {
        // Past the default validation leeway of 60 seconds.
        let signer = TokenSigner::new("test-secret", -120);
        let token = signer.issue("alice")?;
        assert!(signer.verify(&token).is_err());

        // The same token still verifies under a fresh-TTL signer with the
        // same secret only if the embedded expiry allows it; it does not.
        let fresh = TokenSigner::new("test-secret", 1800);
        assert!(fresh.verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn distinct_tokens_for_same_subject() -> Result<()> {
        let signer = TokenSigner::new("test-secret", 1800);
        let first = signer.issue("alice")?;
        let second = signer.issue("alice")?;
        assert_ne!(first, second);
        Ok(())
    }
}
