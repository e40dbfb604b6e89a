use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;
use uuid::Uuid;

use super::ids::IdentityId;

/// Bytes of randomness per token value (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// What a single-use token authorizes. Tokens of one kind are never accepted
/// by a flow expecting another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EmailVerify,
    PasswordReset,
    EmailChange,
    MagicLink,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown token kind: {0}")]
pub struct UnknownTokenKind(pub String);

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::EmailVerify => "email_verify",
            TokenKind::PasswordReset => "password_reset",
            TokenKind::EmailChange => "email_change",
            TokenKind::MagicLink => "magic_link",
        }
    }
}

impl FromStr for TokenKind {
    type Err = UnknownTokenKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_verify" => Ok(TokenKind::EmailVerify),
            "password_reset" => Ok(TokenKind::PasswordReset),
            "email_change" => Ok(TokenKind::EmailChange),
            "magic_link" => Ok(TokenKind::MagicLink),
            other => Err(UnknownTokenKind(other.to_owned())),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw, unguessable token value. It is the only credential; records are
/// never looked up by id.
#[derive(Debug, Clone)]
pub struct TokenValue(Secret<String>);

impl TokenValue {
    /// 32 bytes from the thread-local CSPRNG, hex encoded.
    pub fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = rand::rng().random();
        Self(Secret::new(hex::encode(bytes)))
    }

    pub fn new(raw: impl Into<String>) -> Self {
        Self(Secret::new(raw.into()))
    }
}

impl ExposeSecret<String> for TokenValue {
    fn expose_secret(&self) -> &String {
        self.0.expose_secret()
    }
}

#[derive(Debug, Clone)]
pub struct SingleUseToken {
    pub id: Uuid,
    pub owner_id: IdentityId,
    pub kind: TokenKind,
    pub value: TokenValue,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SingleUseToken {
    /// A new unconsumed token expiring `ttl` after `now`. A non-positive ttl
    /// yields a token that is already expired.
    pub fn issue(
        owner_id: IdentityId,
        kind: TokenKind,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            value: TokenValue::generate(),
            expires_at: now + ttl,
            consumed_at: None,
            created_at: now,
        }
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && now < self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}
