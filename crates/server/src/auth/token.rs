use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::AuthError;
use crate::config::AuthConfig;

/// Claim names owned by the issuer; extras can never override them.
const RESERVED_CLAIMS: &[&str] = &["sub", "role", "iat", "exp"];

/// Claims supplied by the caller at login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSet {
    pub sub: String,
    pub role: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ClaimSet {
    pub fn new(sub: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            role: role.into(),
            extra: Map::new(),
        }
    }
}

/// Claims carried by a verified token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub claims: ClaimSet,
    /// Issued-at, epoch seconds
    pub iat: i64,
    /// Expiration, epoch seconds
    pub exp: i64,
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub ttl: Duration,
}

/// Issues and verifies signed, time-limited bearer tokens.
///
/// Stateless: nothing is stored per token, so a token stays valid until its
/// `exp` passes.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<Keys>,
}

struct Keys {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            inner: Arc::new(Keys {
                algorithm: config.algorithm,
                encoding: EncodingKey::from_secret(config.secret_key.as_bytes()),
                decoding: DecodingKey::from_secret(config.secret_key.as_bytes()),
                validation,
                ttl: Duration::try_minutes(config.access_token_expire_minutes)
                    .unwrap_or(Duration::MAX),
            }),
        }
    }

    /// Sign `claims` with an expiration of now + TTL.
    pub fn issue(&self, claims: ClaimSet) -> Result<IssuedToken, AuthError> {
        self.issue_at(claims, Utc::now())
    }

    /// Sign `claims` as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        mut claims: ClaimSet,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        claims
            .extra
            .retain(|name, _| !RESERVED_CLAIMS.contains(&name.as_str()));

        let expires_at = issued_at
            .checked_add_signed(self.inner.ttl)
            .ok_or_else(|| AuthError::Signing("token expiry out of range".into()))?;
        let payload = Claims {
            claims,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(self.inner.algorithm),
            &payload,
            &self.inner.encoding,
        )
        .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at,
            ttl: self.inner.ttl,
        })
    }

    /// Check signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })
    }
}
