use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

use super::{
    email::Email,
    ids::{IdentityId, TenantId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    Admin,
    #[default]
    User,
    Viewer,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Viewer => "viewer",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "viewer" => Ok(Role::Viewer),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An encoded password hash (PHC string). The salt and parameters travel inside it.
#[derive(Debug, Clone)]
pub struct HashedPassword(Secret<String>);

impl HashedPassword {
    pub fn new(encoded: Secret<String>) -> Self {
        Self(encoded)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub id: IdentityId,
    pub tenant_id: TenantId,
    pub email: Email,
    pub password_hash: Option<HashedPassword>,
    pub role: Role,
    pub pending_email: Option<Email>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// A fresh, unverified identity.
    pub fn new(
        tenant_id: TenantId,
        email: Email,
        password_hash: Option<HashedPassword>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: IdentityId::new(),
            tenant_id,
            email,
            password_hash,
            role,
            pending_email: None,
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// False for passwordless (magic-link only) accounts. An empty stored hash
    /// counts as no password.
    pub fn has_password(&self) -> bool {
        self.password_hash
            .as_ref()
            .is_some_and(|hash| !hash.expose().is_empty())
    }

    pub fn is_email_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_viewer(&self) -> bool {
        self.role == Role::Viewer
    }

    /// Copy safe to hand to request handlers: the password hash is dropped.
    pub fn without_credentials(&self) -> Self {
        Self {
            password_hash: None,
            ..self.clone()
        }
    }
}
