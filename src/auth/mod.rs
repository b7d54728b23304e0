pub mod cookie;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::SecurityConfig;

/// Lifetime of an admin credential.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn admin_at(issued_at: DateTime<Utc>) -> Self {
        Self {
            admin: true,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid password")]
    InvalidCredentials,
    #[error("Authentication token is missing")]
    TokenMissing,
    #[error("Authentication token is invalid")]
    TokenInvalid,
    #[error("Authentication token has expired")]
    TokenExpired,
    #[error("Authentication token does not grant admin access")]
    InsufficientClaim,
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// A freshly signed credential.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues and verifies admin credentials. Holds no per-request state.
pub struct TokenService {
    admin_password: secrecy::SecretString,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    peek_validation: Validation,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        let secret = security.jwt_secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        // Used only to read `exp` before the signature check.
        let mut peek_validation = Validation::new(Algorithm::HS256);
        peek_validation.insecure_disable_signature_validation();
        peek_validation.validate_exp = false;
        peek_validation.required_spec_claims.clear();

        Self {
            admin_password: security.admin_password.clone(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            peek_validation,
        }
    }

    pub fn issue(&self, password: &str) -> Result<IssuedToken, AuthError> {
        let expected = self.admin_password.expose_secret().as_bytes();
        if !bool::from(password.as_bytes().ct_eq(expected)) {
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims::admin_at(Utc::now());
        let token = self.sign(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;

        let unverified = decode::<Claims>(token, &self.decoding_key, &self.peek_validation)
            .map_err(|_| AuthError::TokenInvalid)?
            .claims;
        if unverified.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })?
            .claims;

        if !claims.admin {
            return Err(AuthError::InsufficientClaim);
        }

        Ok(claims)
    }
}
