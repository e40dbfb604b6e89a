pub mod config;
pub mod crypto;
pub mod persistence;
pub mod session;
pub mod telemetry;

pub use config::AuthSettings;
pub use crypto::argon2_hasher::Argon2Hasher;
pub use persistence::{
    dashmap_token_ledger::DashMapTokenLedger,
    hashmap_identity_store::HashMapIdentityStore,
    hashmap_tenant_store::HashMapTenantStore,
    postgres::{connect_postgres, run_migrations},
    postgres_identity_store::PostgresIdentityStore,
    postgres_tenant_store::PostgresTenantStore,
    postgres_token_ledger::PostgresTokenLedger,
    redis_token_ledger::{RedisTokenLedger, connect_redis},
};
pub use session::{
    cookie::{DEFAULT_SESSION_COOKIE_NAME, SessionCookies},
    jwt_codec::{JwtSessionCodec, SESSION_ALGORITHM},
};
