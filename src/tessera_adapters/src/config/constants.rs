pub mod env {
    pub const ENV_PREFIX: &str = "TESSERA";
    pub const ENVIRONMENT_ENV_VAR: &str = "TESSERA_ENVIRONMENT";
    pub const SESSION_SECRET_ENV_VAR: &str = "TESSERA_SESSION__SECRET";
    pub const SESSION_TTL_ENV_VAR: &str = "TESSERA_SESSION__TTL_IN_SECONDS";
    pub const DATABASE_URL_ENV_VAR: &str = "TESSERA_POSTGRES__URL";
    pub const REDIS_HOST_NAME_ENV_VAR: &str = "TESSERA_REDIS__HOST_NAME";
}

/// Optional settings file, resolved relative to the working directory.
pub const CONFIG_FILE: &str = "config/base";

pub mod defaults {
    /// Seven days.
    pub const SESSION_TTL_IN_SECONDS: i64 = 7 * 24 * 60 * 60;
    pub const SESSION_COOKIE_NAME: &str = "auth_token";

    pub const HASH_MEMORY_KIB: u32 = 15000;
    pub const HASH_ITERATIONS: u32 = 2;
    pub const HASH_PARALLELISM: u32 = 1;
}
