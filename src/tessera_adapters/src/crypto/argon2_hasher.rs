use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{self, PasswordHasher, SaltString, rand_core},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use tessera_core::{CredentialHasher, CredentialHasherError, HashedPassword, Password};

/// Argon2id hasher. Work runs on the blocking pool so request tasks are not
/// starved while a hash is computed.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Cost parameters: memory in KiB, passes, lanes.
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, CredentialHasherError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| CredentialHasherError::Hashing(e.to_string()))?;
        Ok(Self::new(params))
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[async_trait]
impl CredentialHasher for Argon2Hasher {
    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash(&self, password: Password) -> Result<HashedPassword, CredentialHasherError> {
        let current_span: tracing::Span = tracing::Span::current();
        let hasher = self.argon2();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let salt = SaltString::generate(rand_core::OsRng);
                hasher
                    .hash_password(password.as_ref().expose_secret().as_bytes(), &salt)
                    .map(|h| HashedPassword::new(Secret::from(h.to_string())))
                    .map_err(|e| CredentialHasherError::Hashing(e.to_string()))
            })
        })
        .await
        .map_err(|e| CredentialHasherError::Hashing(e.to_string()))?
    }

    #[tracing::instrument(name = "Verify password hash", skip_all)]
    async fn verify(
        &self,
        candidate: Password,
        expected: HashedPassword,
    ) -> Result<bool, CredentialHasherError> {
        let current_span: tracing::Span = tracing::Span::current();
        let verifier = self.argon2();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let expected = PasswordHash::new(expected.expose())
                    .map_err(|e| CredentialHasherError::MalformedHash(e.to_string()))?;

                match verifier
                    .verify_password(candidate.as_ref().expose_secret().as_bytes(), &expected)
                {
                    Ok(()) => Ok(true),
                    Err(password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(CredentialHasherError::Verification(e.to_string())),
                }
            })
        })
        .await
        .map_err(|e| CredentialHasherError::Verification(e.to_string()))?
    }
}
