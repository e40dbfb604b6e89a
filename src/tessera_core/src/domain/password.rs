use secrecy::{ExposeSecret, Secret};

use super::password_policy::{self, PolicyViolation};

/// A plaintext password held in memory only long enough to hash or verify it.
///
/// `Password::new` wraps a login candidate as-is; newly chosen passwords go
/// through `TryFrom`, which applies the strength policy.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn new(secret: Secret<String>) -> Self {
        Self(secret)
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = PolicyViolation;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        password_policy::validate(value.expose_secret())?;
        Ok(Self(value))
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
