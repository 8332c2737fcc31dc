//! Identity and token verification.
//!
//! Token issuance belongs to the auth collaborator; this module only
//! consumes tokens through the [`TokenVerifier`] capability. The production
//! implementation verifies HS256 JWTs; the in-memory one backs tests and
//! local development.

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::game::entities::PlayerId;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum AuthError {
    #[error("no token provided")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("expired token")]
    ExpiredToken,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,
    Admin,
}

/// Who a verified token belongs to.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Identity {
    pub user_id: PlayerId,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    sub: PlayerId,
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Role,
    exp: i64,
}

/// Verifies HS256 JWTs signed with a shared secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;
        let claims = data.claims;
        Ok(Identity {
            user_id: claims.sub,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Fixed token-to-identity mapping for tests and local development.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    identities: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, identity: Identity) {
        self.identities.insert(token.into(), identity);
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.identities
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
