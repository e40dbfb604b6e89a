use chrono::TimeDelta;
use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;
use tessera_core::CredentialHasherError;

use super::constants::{CONFIG_FILE, defaults, env::ENV_PREFIX};
use crate::{
    crypto::argon2_hasher::Argon2Hasher,
    session::{cookie::SessionCookies, jwt_codec::JwtSessionCodec},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    #[default]
    Development,
    Production,
}

impl DeploymentEnvironment {
    pub fn is_production(&self) -> bool {
        *self == DeploymentEnvironment::Production
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub secret: Secret<String>,
    #[serde(default = "default_session_ttl")]
    pub ttl_in_seconds: i64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_session_ttl() -> i64 {
    defaults::SESSION_TTL_IN_SECONDS
}

fn default_cookie_name() -> String {
    defaults::SESSION_COOKIE_NAME.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashingSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            memory_kib: defaults::HASH_MEMORY_KIB,
            iterations: defaults::HASH_ITERATIONS,
            parallelism: defaults::HASH_PARALLELISM,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    pub host_name: String,
}

/// Settings for the auth subsystem, layered from an optional `config/base`
/// file, then `.env`, then `TESSERA_*` environment variables
/// (`TESSERA_SESSION__SECRET`, `TESSERA_POSTGRES__URL`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub environment: DeploymentEnvironment,
    pub session: SessionSettings,
    #[serde(default)]
    pub hashing: HashingSettings,
    pub postgres: Option<PostgresSettings>,
    pub redis: Option<RedisSettings>,
}

impl AuthSettings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(environment_source())
            .build()?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }

    pub fn session_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.session.ttl_in_seconds)
    }

    pub fn session_codec(&self) -> JwtSessionCodec {
        JwtSessionCodec::new(self.session.secret.clone())
    }

    /// Cookies are marked `Secure` in production only.
    pub fn session_cookies(&self) -> SessionCookies {
        SessionCookies::new(
            self.session.cookie_name.clone(),
            self.environment.is_production(),
        )
    }

    pub fn credential_hasher(&self) -> Result<Argon2Hasher, CredentialHasherError> {
        Argon2Hasher::with_cost(
            self.hashing.memory_kib,
            self.hashing.iterations,
            self.hashing.parallelism,
        )
    }
}

/// `TESSERA_SESSION__TTL_IN_SECONDS` maps to `session.ttl_in_seconds`.
pub fn environment_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
