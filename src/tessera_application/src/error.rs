use tessera_core::{
    CredentialHasherError, EmailError, IdentityStoreError, PolicyViolation, SessionError,
    TenantStoreError, TokenLedgerError,
};

/// Every failure an authentication flow can surface to its caller.
///
/// Lookups on enumeration-sensitive paths collapse into `InvalidCredentials`
/// or `InvalidOrExpired` before reaching this type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email address has not been verified")]
    EmailNotVerified,
    #[error("Account has no password; sign in with a magic link")]
    PasswordlessAccount,
    #[error("Link is invalid or has expired")]
    InvalidOrExpired,
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("Password rejected: {0}")]
    PolicyViolation(#[from] PolicyViolation),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("An account with this email already exists")]
    DuplicateIdentity,
    #[error("A tenant with this subdomain already exists")]
    DuplicateTenant,
    #[error("Not found")]
    NotFound,
    #[error("Tenant is not active")]
    InactiveTenant,
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Credential hashing failed: {0}")]
    CredentialHashing(#[from] CredentialHasherError),
}

/// What a user-facing surface may reveal about an [`AuthError`].
///
/// Lookups that would confirm whether an account exists collapse into
/// `InvalidCredentials`, and infrastructure detail is reduced to `Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicErrorKind {
    InvalidCredentials,
    EmailNotVerified,
    PasswordlessAccount,
    InvalidOrExpired,
    InvalidInput,
    Conflict,
    Forbidden,
    Unavailable,
}

impl PublicErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            PublicErrorKind::InvalidCredentials => "Invalid credentials",
            PublicErrorKind::EmailNotVerified => "Email address has not been verified",
            PublicErrorKind::PasswordlessAccount => "Sign in with a magic link",
            PublicErrorKind::InvalidOrExpired => "Link is invalid or has expired",
            PublicErrorKind::InvalidInput => "Invalid input",
            PublicErrorKind::Conflict => "Already in use",
            PublicErrorKind::Forbidden => "Access denied",
            PublicErrorKind::Unavailable => "Service temporarily unavailable",
        }
    }
}

impl AuthError {
    pub fn public_kind(&self) -> PublicErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::NotFound | AuthError::Session(_) => {
                PublicErrorKind::InvalidCredentials
            }
            AuthError::EmailNotVerified => PublicErrorKind::EmailNotVerified,
            AuthError::PasswordlessAccount => PublicErrorKind::PasswordlessAccount,
            AuthError::InvalidOrExpired => PublicErrorKind::InvalidOrExpired,
            AuthError::InvalidEmail(_) | AuthError::PolicyViolation(_) => {
                PublicErrorKind::InvalidInput
            }
            AuthError::DuplicateIdentity | AuthError::DuplicateTenant => PublicErrorKind::Conflict,
            AuthError::InactiveTenant => PublicErrorKind::Forbidden,
            AuthError::StoreUnavailable(_) | AuthError::CredentialHashing(_) => {
                PublicErrorKind::Unavailable
            }
        }
    }
}

impl From<IdentityStoreError> for AuthError {
    fn from(e: IdentityStoreError) -> Self {
        match e {
            IdentityStoreError::DuplicateIdentity => AuthError::DuplicateIdentity,
            IdentityStoreError::NotFound => AuthError::NotFound,
            IdentityStoreError::UnexpectedError(e) => {
                AuthError::StoreUnavailable(format!("identity store: {e}"))
            }
        }
    }
}

impl From<TenantStoreError> for AuthError {
    fn from(e: TenantStoreError) -> Self {
        match e {
            TenantStoreError::NotFound => AuthError::NotFound,
            TenantStoreError::DuplicateSubdomain => AuthError::DuplicateTenant,
            TenantStoreError::UnexpectedError(e) => {
                AuthError::StoreUnavailable(format!("tenant store: {e}"))
            }
        }
    }
}

impl From<TokenLedgerError> for AuthError {
    fn from(e: TokenLedgerError) -> Self {
        match e {
            TokenLedgerError::NotFound => AuthError::InvalidOrExpired,
            TokenLedgerError::UnexpectedError(e) => {
                AuthError::StoreUnavailable(format!("token ledger: {e}"))
            }
        }
    }
}
