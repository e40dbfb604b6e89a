pub mod dashmap_token_ledger;
pub mod hashmap_identity_store;
pub mod hashmap_tenant_store;
pub mod postgres;
pub mod postgres_identity_store;
pub mod postgres_tenant_store;
pub mod postgres_token_ledger;
pub mod redis_token_ledger;
