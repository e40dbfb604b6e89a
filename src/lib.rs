//! # Tessera - Tenant-Aware Authentication Core
//!
//! This is a facade crate that re-exports the public APIs of the tessera
//! components: domain types and ports, the authentication flows, and the
//! infrastructure adapters that back them.
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `Identity`, `SingleUseToken`, etc.
//! - **Ports**: `IdentityStore`, `TenantStore`, `TokenLedger`, `CredentialHasher`, `SessionCodec`
//! - **Flows**: `AuthCoordinator` plus the registration, verification, reset and
//!   email-change use cases
//! - **Adapters**: Argon2 hashing, JWT sessions and cookies, in-memory/PostgreSQL/Redis persistence

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and ports
pub mod core {
    pub use tessera_core::*;
}

// Re-export most commonly used core types at the root level
pub use tessera_core::{
    Email, EmailError, HashedPassword, Identity, IdentityId, IssuedSession, Password,
    PolicyViolation, Role, SessionClaims, SessionToken, SingleUseToken, Tenant, TenantId,
    TenantStatus, TokenKind, TokenValue, password_policy,
};

// ============================================================================
// Ports
// ============================================================================

pub use tessera_core::{
    CredentialHasher, CredentialHasherError, IdentityStore, IdentityStoreError, SessionCodec,
    SessionError, TenantStore, TenantStoreError, TokenLedger, TokenLedgerError,
};

// ============================================================================
// Authentication Flows (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use tessera_application::*;
}

pub use tessera_application::{
    AuthCoordinator, AuthError, AuthenticatedContext, ChangePasswordUseCase, EmailChangeUseCase,
    EmailVerificationUseCase, PasswordResetUseCase, PublicErrorKind, RegisterUseCase,
    Registration,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use tessera_adapters::persistence::*;
    }

    /// Session tokens and cookies
    pub mod session {
        pub use tessera_adapters::session::*;
    }

    /// Configuration
    pub mod config {
        pub use tessera_adapters::config::*;
    }

    pub use tessera_adapters::telemetry;
}

pub use tessera_adapters::{
    Argon2Hasher, AuthSettings, DashMapTokenLedger, HashMapIdentityStore, HashMapTenantStore,
    JwtSessionCodec, PostgresIdentityStore, PostgresTenantStore, PostgresTokenLedger,
    RedisTokenLedger, SessionCookies, connect_postgres, connect_redis, run_migrations,
};

/// Coordinator over the in-process stores; for tests and single-node deployments.
pub type InMemoryAuthCoordinator = AuthCoordinator<
    HashMapIdentityStore,
    HashMapTenantStore,
    DashMapTokenLedger,
    Argon2Hasher,
    JwtSessionCodec,
>;

pub type PostgresAuthCoordinator = AuthCoordinator<
    PostgresIdentityStore,
    PostgresTenantStore,
    PostgresTokenLedger,
    Argon2Hasher,
    JwtSessionCodec,
>;

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing the port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use chrono::TimeDelta;
pub use http;
