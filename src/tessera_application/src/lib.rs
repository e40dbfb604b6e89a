pub mod auth_coordinator;
pub mod error;
mod tokens;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use auth_coordinator::{AuthCoordinator, AuthenticatedContext, MAGIC_LINK_TTL_MINUTES};
pub use error::{AuthError, PublicErrorKind};
pub use use_cases::{
    change_password::ChangePasswordUseCase,
    email_change::{EMAIL_CHANGE_TTL_HOURS, EmailChangeUseCase},
    email_verification::{EMAIL_VERIFICATION_TTL_HOURS, EmailVerificationUseCase},
    password_reset::{PASSWORD_RESET_TTL_HOURS, PasswordResetUseCase},
    register::{RegisterUseCase, Registration},
};
