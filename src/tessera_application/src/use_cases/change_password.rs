use chrono::Utc;
use secrecy::Secret;
use tessera_core::{CredentialHasher, IdentityId, IdentityStore, Password};

use crate::error::AuthError;

/// Change password use case - replaces the password of a signed-in identity
pub struct ChangePasswordUseCase<I, H>
where
    I: IdentityStore,
    H: CredentialHasher,
{
    identities: I,
    hasher: H,
}

impl<I, H> ChangePasswordUseCase<I, H>
where
    I: IdentityStore,
    H: CredentialHasher,
{
    pub fn new(identities: I, hasher: H) -> Self {
        Self { identities, hasher }
    }

    /// Execute the change password use case
    ///
    /// # Arguments
    /// * `identity_id` - The signed-in identity (from the verified session)
    /// * `current_password` - Must match the stored hash
    /// * `new_password` - Checked against the password policy before hashing
    ///
    /// # Returns
    /// Ok(()) on success. Passwordless accounts get `PasswordlessAccount`
    /// and a wrong current password gets `InvalidCredentials`.
    #[tracing::instrument(
        name = "ChangePasswordUseCase::execute",
        skip(self, current_password, new_password)
    )]
    pub async fn execute(
        &self,
        identity_id: IdentityId,
        current_password: Password,
        new_password: Secret<String>,
    ) -> Result<(), AuthError> {
        let mut identity = self.identities.get_by_id(identity_id).await?;

        let Some(expected) = identity.password_hash.clone().filter(|_| identity.has_password())
        else {
            return Err(AuthError::PasswordlessAccount);
        };

        if !self.hasher.verify(current_password, expected).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let new_password = Password::try_from(new_password)?;
        identity.password_hash = Some(self.hasher.hash(new_password).await?);
        identity.updated_at = Utc::now();
        self.identities.update(&identity).await?;

        tracing::info!(identity_id = %identity.id, "password changed");
        Ok(())
    }
}
