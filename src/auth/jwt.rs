/// JWT Token Generation and Validation
///
/// HS256-signed access tokens. Verification is stateless: signature, issuer
/// and expiry are all that decide validity.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::AccessTokenError;

/// Signs and verifies access tokens with one symmetric key
#[derive(Clone)]
pub struct AccessTokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl std::fmt::Debug for AccessTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenSigner")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl AccessTokenSigner {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Issue an access token for `subject`, valid from `now` for `ttl`
    ///
    /// # Errors
    /// Returns error if the token cannot be signed
    pub fn issue(
        &self,
        subject: Uuid,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AccessTokenError> {
        let claims = Claims::new(subject, now, ttl, &self.issuer);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AccessTokenError::Signing(e.to_string()))
    }

    /// Verify a token as of `now` and return its subject
    ///
    /// # Errors
    /// - `InvalidSignature` if the token was not signed with this key
    /// - `Malformed` if it cannot be decoded, has the wrong issuer or subject
    /// - `Expired` if `now >= exp`
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, AccessTokenError> {
        let claims = self.decode_claims(token)?;

        if claims.is_expired_at(now) {
            return Err(AccessTokenError::Expired);
        }

        claims.user_id()
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AccessTokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        // Expiry is judged against the injected clock in `verify`
        validation.validate_exp = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AccessTokenError::InvalidSignature,
                _ => AccessTokenError::Malformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn signer() -> AccessTokenSigner {
        AccessTokenSigner::new(SECRET, "test")
    }

    #[test]
    fn test_issue_and_verify_token() {
        let signer = signer();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let token = signer
            .issue(user_id, Duration::hours(1), now)
            .expect("Failed to generate token");
        let subject = signer.verify(&token, now).expect("Failed to validate token");

        assert_eq!(subject, user_id);
    }

    #[test]
    fn test_token_valid_until_expiry() {
        let signer = signer();
        let user_id = Uuid::new_v4();
        let issued = Utc::now();
        let token = signer.issue(user_id, Duration::minutes(1), issued).unwrap();

        assert_eq!(signer.verify(&token, issued + Duration::seconds(59)).unwrap(), user_id);
        assert_eq!(
            signer.verify(&token, issued + Duration::seconds(60)),
            Err(AccessTokenError::Expired)
        );
        assert_eq!(
            signer.verify(&token, issued + Duration::hours(5)),
            Err(AccessTokenError::Expired)
        );
    }

    #[test]
    fn test_negative_ttl_is_already_expired() {
        let signer = signer();
        let now = Utc::now();
        let token = signer.issue(Uuid::new_v4(), -Duration::minutes(1), now).unwrap();

        assert_eq!(signer.verify(&token, now), Err(AccessTokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let token = AccessTokenSigner::new("correct-secret", "test")
            .issue(Uuid::new_v4(), Duration::minutes(1), now)
            .unwrap();

        let result = AccessTokenSigner::new("wrong-secret", "test").verify(&token, now);

        assert_eq!(result, Err(AccessTokenError::InvalidSignature));
    }

    #[test]
    fn test_wrong_secret_wins_over_expiry() {
        let now = Utc::now();
        let token = AccessTokenSigner::new("correct-secret", "test")
            .issue(Uuid::new_v4(), Duration::minutes(1), now)
            .unwrap();

        let result = AccessTokenSigner::new("wrong-secret", "test")
            .verify(&token, now + Duration::hours(1));

        assert_eq!(result, Err(AccessTokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let result = signer().verify("invalid.token.here", Utc::now());

        assert!(matches!(result, Err(AccessTokenError::Malformed(_))));
    }

    #[test]
    fn test_tampered_token() {
        let signer = signer();
        let now = Utc::now();
        let token = signer.issue(Uuid::new_v4(), Duration::hours(1), now).unwrap();

        let tampered = format!("{}X", token);

        assert!(signer.verify(&tampered, now).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let now = Utc::now();
        let token = AccessTokenSigner::new(SECRET, "test")
            .issue(Uuid::new_v4(), Duration::hours(1), now)
            .unwrap();

        let result = AccessTokenSigner::new(SECRET, "wrong-issuer").verify(&token, now);

        assert!(matches!(result, Err(AccessTokenError::Malformed(_))));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let rendered = format!("{:?}", signer());
        assert!(!rendered.contains(SECRET));
    }
}
