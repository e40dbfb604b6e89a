pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    email::{Email, EmailError},
    identity::{HashedPassword, Identity, Role, UnknownRole},
    ids::{IdentityId, TenantId},
    password::Password,
    password_policy::{self, PolicyViolation},
    session::{IssuedSession, SessionClaims, SessionToken},
    tenant::{Tenant, TenantStatus, UnknownTenantStatus},
    token::{SingleUseToken, TokenKind, TokenValue, UnknownTokenKind},
};

pub use ports::{
    repositories::{
        IdentityStore, IdentityStoreError, TenantStore, TenantStoreError, TokenLedger,
        TokenLedgerError,
    },
    services::{CredentialHasher, CredentialHasherError, SessionCodec, SessionError},
};
