use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Decoded identity token. Whatever the caller posted at issuance lives in
/// `identity`; `iat`/`exp` are added by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub identity: Map<String, Value>,
}

impl Claims {
    pub fn email(&self) -> Option<&str> {
        self.identity.get("email").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenError {
    Invalid,
    Expired,
    Malformed,
    ReservedClaim(&'static str),
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Invalid => write!(f, "Invalid token"),
            TokenError::Expired => write!(f, "Token expired"),
            TokenError::Malformed => write!(f, "Malformed token"),
            TokenError::ReservedClaim(claim) => {
                write!(f, "Claim '{}' is set by the server and cannot be supplied", claim)
            }
            TokenError::Signing(msg) => write!(f, "Failed to sign token: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Signs the caller's claims. A numeric `iat` in the payload is honored
    /// as the issue time.
    pub fn issue(&self, identity: Map<String, Value>) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    pub fn issue_at(&self, mut identity: Map<String, Value>, now: i64) -> Result<String, TokenError> {
        if identity.contains_key("exp") {
            return Err(TokenError::ReservedClaim("exp"));
        }
        let iat = match identity.remove("iat") {
            Some(value) => value.as_i64().ok_or(TokenError::ReservedClaim("iat"))?,
            None => now,
        };

        let exp = iat
            .checked_add(self.ttl.num_seconds())
            .ok_or(TokenError::ReservedClaim("iat"))?;

        let claims = Claims { iat, exp, identity };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Callers pick their own claim set; only expiry is enforced.
        validation.validate_aud = false;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes", Duration::hours(24))
    }

    fn identity(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_roundtrip_preserves_claims() {
        let svc = service();
        let claims = identity(json!({ "email": "a@x.com", "name": "Ada", "tags": [1, 2] }));

        let token = svc.issue(claims.clone()).unwrap();
        let decoded = svc.verify(&token).unwrap();

        assert_eq!(decoded.identity, claims);
        assert_eq!(decoded.exp - decoded.iat, 24 * 3600);
        assert_eq!(decoded.email(), Some("a@x.com"));
    }

    #[test]
    fn test_expired_token() {
        let svc = service();
        let issued = Utc::now().timestamp() - 25 * 3600;
        let token = svc.issue_at(identity(json!({ "email": "a@x.com" })), issued).unwrap();

        assert_eq!(svc.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_malformed_token() {
        assert_eq!(service().verify("not-a-token"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let other = TokenService::new("another_secret", Duration::hours(24));
        let token = other.issue(identity(json!({ "email": "a@x.com" }))).unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_reserved_exp_rejected() {
        let err = service()
            .issue(identity(json!({ "email": "a@x.com", "exp": 1 })))
            .unwrap_err();
        assert_eq!(err, TokenError::ReservedClaim("exp"));
    }

    #[test]
    fn test_iat_near_max_rejected() {
        let svc = service();
        let err = svc
            .issue(identity(json!({ "email": "a@x.com", "iat": i64::MAX })))
            .unwrap_err();
        assert!(matches!(err, TokenError::ReservedClaim("iat")));
    }

    #[test]
    fn test_supplied_iat_sets_expiry() {
        let svc = service();
        let now = Utc::now().timestamp();
        let token = svc.issue(identity(json!({ "email": "a@x.com", "iat": now - 60 }))).unwrap();
        let decoded = svc.verify(&token).unwrap();

        assert_eq!(decoded.iat, now - 60);
        assert_eq!(decoded.exp, now - 60 + 24 * 3600);
        assert!(!decoded.identity.contains_key("iat"));
    }
}
