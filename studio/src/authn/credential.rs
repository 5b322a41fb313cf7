//! Bearer credential

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Claims the client looks at when the token happens to be a JWT
#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// An opaque bearer token representing a signed-in session
#[derive(Clone)]
pub struct Credential {
    secret: Arc<SecretString>,
}

impl Credential {
    /// Wrap a raw token string
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            secret: Arc::new(SecretString::new(raw.into().into_boxed_str())),
        }
    }

    /// The raw token
    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }

    /// Expiration of the token, when it decodes as a JWT carrying `exp`.
    /// The signature is not checked; the backend remains the authority.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expose();
        let header = decode_header(raw).ok()?;

        let mut validation = Validation::new(header.alg);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<ExpiryClaims>(raw, &DecodingKey::from_secret(b""), &validation).ok()?;
        DateTime::<Utc>::from_timestamp(data.claims.exp, 0)
    }

    /// Whether the token is a JWT that has already expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}
