use secrecy::Secret;
use tessera_core::{
    CredentialHasher, Email, Identity, IdentityStore, Password, Role, TenantId, TenantStore,
};

use crate::error::AuthError;

/// Input to [`RegisterUseCase::execute`].
#[derive(Debug)]
pub struct Registration {
    pub tenant_id: TenantId,
    pub email: String,
    /// `None` creates a passwordless (magic-link only) account.
    pub password: Option<Secret<String>>,
    pub role: Role,
}

/// Register use case - creates an unverified identity in an active tenant
pub struct RegisterUseCase<I, T, H>
where
    I: IdentityStore,
    T: TenantStore,
    H: CredentialHasher,
{
    identities: I,
    tenants: T,
    hasher: H,
}

impl<I, T, H> RegisterUseCase<I, T, H>
where
    I: IdentityStore,
    T: TenantStore,
    H: CredentialHasher,
{
    pub fn new(identities: I, tenants: T, hasher: H) -> Self {
        Self {
            identities,
            tenants,
            hasher,
        }
    }

    #[tracing::instrument(
        name = "RegisterUseCase::execute",
        skip_all,
        fields(tenant_id = %registration.tenant_id)
    )]
    pub async fn execute(&self, registration: Registration) -> Result<Identity, AuthError> {
        let email = Email::parse(&registration.email)?;

        let tenant = self.tenants.get_by_id(registration.tenant_id).await?;
        if !tenant.is_active() {
            return Err(AuthError::InactiveTenant);
        }

        let password_hash = match registration.password {
            Some(secret) => {
                let password = Password::try_from(secret)?;
                Some(self.hasher.hash(password).await?)
            }
            None => None,
        };

        let identity = Identity::new(tenant.id, email, password_hash, registration.role);
        self.identities.insert(identity.clone()).await?;

        tracing::info!(identity_id = %identity.id, "identity registered");
        Ok(identity.without_credentials())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use tessera_core::{PolicyViolation, Tenant, TenantStatus};

    async fn use_case(
        tenant: Tenant,
    ) -> (
        RegisterUseCase<MockIdentityStore, MockTenantStore, PlainHasher>,
        MockIdentityStore,
    ) {
        let identities = MockIdentityStore::default();
        let tenants = MockTenantStore::with(tenant).await;
        (
            RegisterUseCase::new(identities.clone(), tenants, PlainHasher),
            identities,
        )
    }

    fn registration(tenant_id: TenantId, email: &str, password: Option<&str>) -> Registration {
        Registration {
            tenant_id,
            email: email.to_owned(),
            password: password.map(secret),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn registers_unverified_identity_with_hashed_password() {
        let tenant = Tenant::new("Acme", "acme");
        let (use_case, identities) = use_case(tenant.clone()).await;

        let identity = use_case
            .execute(registration(tenant.id, "Alice@Example.com", Some(PASSWORD)))
            .await
            .unwrap();

        assert_eq!(identity.email.as_str(), "alice@example.com");
        assert!(!identity.is_email_verified());
        assert!(identity.password_hash.is_none());

        let stored = identities.stored(identity.id).await;
        assert_eq!(
            stored.password_hash.unwrap().expose(),
            plain_hash(PASSWORD).expose()
        );
    }

    #[tokio::test]
    async fn registers_passwordless_identity() {
        let tenant = Tenant::new("Acme", "acme");
        let (use_case, identities) = use_case(tenant.clone()).await;

        let identity = use_case
            .execute(registration(tenant.id, "alice@example.com", None))
            .await
            .unwrap();

        assert!(!identities.stored(identity.id).await.has_password());
    }

    #[tokio::test]
    async fn rejects_weak_passwords() {
        let tenant = Tenant::new("Acme", "acme");
        let (use_case, _) = use_case(tenant.clone()).await;

        let result = use_case
            .execute(registration(tenant.id, "alice@example.com", Some("password123!")))
            .await;

        assert!(matches!(
            result,
            Err(AuthError::PolicyViolation(PolicyViolation::TooCommon))
        ));
    }

    #[tokio::test]
    async fn rejects_duplicate_email_in_same_tenant_only() {
        let tenant = Tenant::new("Acme", "acme");
        let other = Tenant::new("Globex", "globex");
        let (use_case, identities) = use_case(tenant.clone()).await;
        let other_use_case = RegisterUseCase::new(
            identities.clone(),
            MockTenantStore::with(other.clone()).await,
            PlainHasher,
        );

        use_case
            .execute(registration(tenant.id, "alice@example.com", None))
            .await
            .unwrap();
        let duplicate = use_case
            .execute(registration(tenant.id, "ALICE@example.com", None))
            .await;
        let other_tenant = other_use_case
            .execute(registration(other.id, "alice@example.com", None))
            .await;

        assert!(matches!(duplicate, Err(AuthError::DuplicateIdentity)));
        assert!(other_tenant.is_ok());
    }

    #[tokio::test]
    async fn rejects_unknown_or_inactive_tenants() {
        let mut tenant = Tenant::new("Acme", "acme");
        tenant.status = TenantStatus::Suspended;
        let (use_case, _) = use_case(tenant.clone()).await;

        let suspended = use_case
            .execute(registration(tenant.id, "alice@example.com", None))
            .await;
        let unknown = use_case
            .execute(registration(TenantId::new(), "alice@example.com", None))
            .await;

        assert!(matches!(suspended, Err(AuthError::InactiveTenant)));
        assert!(matches!(unknown, Err(AuthError::NotFound)));
    }

    #[tokio::test]
    async fn rejects_invalid_email() {
        let tenant = Tenant::new("Acme", "acme");
        let (use_case, _) = use_case(tenant.clone()).await;

        let result = use_case
            .execute(registration(tenant.id, "user@@example.com", Some(PASSWORD)))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
    }
}
