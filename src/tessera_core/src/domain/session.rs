use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    email::Email,
    ids::{IdentityId, TenantId},
};

/// The fixed claim set carried by a session token. Tokens whose payload does
/// not deserialize into exactly this shape are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    pub sub: IdentityId,
    pub tenant_id: TenantId,
    pub email: Email,
    /// Seconds since the Unix epoch.
    pub iat: i64,
    /// Seconds since the Unix epoch.
    pub exp: i64,
}

impl SessionClaims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub claims: SessionClaims,
}

impl IssuedSession {
    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }
}
