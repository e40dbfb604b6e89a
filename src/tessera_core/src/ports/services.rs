use async_trait::async_trait;
use chrono::TimeDelta;
use thiserror::Error;

use crate::domain::{
    identity::{HashedPassword, Identity},
    password::Password,
    session::{IssuedSession, SessionClaims},
};

#[derive(Debug, Error)]
pub enum CredentialHasherError {
    #[error("Failed to hash password: {0}")]
    Hashing(String),
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("Failed to verify password: {0}")]
    Verification(String),
}

/// Slow salted one-way hashing for stored passwords.
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash(&self, password: Password) -> Result<HashedPassword, CredentialHasherError>;

    /// `Ok(false)` on mismatch. Comparison time does not depend on where the
    /// candidate diverges.
    async fn verify(
        &self,
        candidate: Password,
        expected: HashedPassword,
    ) -> Result<bool, CredentialHasherError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session signature is invalid")]
    InvalidSignature,
    #[error("Session has expired")]
    Expired,
    #[error("Session token is malformed")]
    Malformed,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

/// Issues and verifies signed, time-bounded session tokens. Validity depends
/// only on the signature and the embedded expiry.
pub trait SessionCodec: Send + Sync {
    fn issue(&self, identity: &Identity, ttl: TimeDelta) -> Result<IssuedSession, SessionError>;
    fn verify(&self, token: &str) -> Result<SessionClaims, SessionError>;
}
