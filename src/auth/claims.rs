/// JWT Claims structure
///
/// Payload of a session token: the caller's identity plus the standard
/// `iat`/`exp`/`iss` claims (RFC 7519).

use serde::{Deserialize, Serialize};

use crate::models::{Identity, Role};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub id: i32,
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    /// Create claims for `identity`, valid for `expiry_seconds` from `issued_at`
    pub fn new(identity: &Identity, issued_at: i64, expiry_seconds: i64, issuer: String) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iat: issued_at,
            exp: issued_at + expiry_seconds,
            iss: issuer,
        }
    }

    /// A token is live strictly before its expiry instant
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}
