/// JWT Token Generation and Validation
///
/// `TokenService` is built once from `JwtSettings` at startup and shared
/// read-only between workers. Tokens are stateless; there is no revocation
/// list.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::models::Identity;

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    expiry_seconds: i64,
}

impl TokenService {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            expiry_seconds: config.token_expiry,
        }
    }

    /// Token lifetime in seconds
    pub fn expiry_seconds(&self) -> i64 {
        self.expiry_seconds
    }

    /// Issue a token for `identity`, valid from now
    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims::new(identity, now.timestamp(), self.expiry_seconds, self.issuer.clone());

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Crypto(format!("Token generation failed: {}", e)))?;

        tracing::debug!(user_id = identity.id, role = %identity.role, "token issued");
        Ok(token)
    }

    /// Verify a token and return the identity it carries
    ///
    /// # Errors
    /// Any signature, structure, issuer or expiry problem yields
    /// `AuthError::InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against the clock value `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        // expiry is checked below against `now`, without leeway
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                AuthError::InvalidToken
            })?;

        if claims.is_expired_at(now.timestamp()) {
            tracing::debug!(user_id = claims.id, "token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims.identity())
    }
}
