use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;

/// Bearer token claims; `sub` is the caller's user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,
    #[error("Invalid JWT token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("JWT token has no subject")]
    MissingSubject,
}

/// Verification settings for HS256 bearer tokens
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
    configured: bool,
}

impl JwtVerifier {
    pub fn new(security: &SecurityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match &security.jwt_audience {
            Some(aud) => validation.set_audience(&[aud.as_str()]),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = &security.jwt_issuer {
            validation.set_issuer(&[iss.as_str()]);
        }

        Self {
            key: DecodingKey::from_secret(security.jwt_secret.as_bytes()),
            validation,
            configured: !security.jwt_secret.is_empty(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        if !self.configured {
            return Err(JwtError::InvalidSecret);
        }
        let token_data = decode::<Claims>(token, &self.key, &self.validation)?;
        if token_data.claims.sub.trim().is_empty() {
            return Err(JwtError::MissingSubject);
        }
        Ok(token_data.claims)
    }
}
