use std::sync::Arc;

use chrono::TimeDelta;
use sqlx::PgPool;
use tessera_adapters::{
    PostgresIdentityStore, PostgresTenantStore, PostgresTokenLedger, connect_postgres,
    run_migrations,
};
use tessera_core::{
    Email, Identity, IdentityStore, IdentityStoreError, Role, Tenant, TenantStore, TokenKind,
    TokenLedger, TokenLedgerError,
};
use testcontainers_modules::{
    postgres::Postgres,
    testcontainers::{ContainerAsync, runners::AsyncRunner},
};
use tokio::task::JoinSet;

async fn postgres() -> (ContainerAsync<Postgres>, PgPool) {
    let container = Postgres::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();

    let pool = connect_postgres(&format!(
        "postgres://postgres:postgres@{host}:{port}/postgres"
    ))
    .await
    .unwrap();
    run_migrations(&pool).await.unwrap();

    (container, pool)
}

async fn seeded(pool: &PgPool) -> (Tenant, Identity) {
    let tenant = Tenant::new("Acme", "acme");
    PostgresTenantStore::new(pool.clone())
        .insert(tenant.clone())
        .await
        .unwrap();

    let identity = Identity::new(
        tenant.id,
        Email::parse("alice@example.com").unwrap(),
        None,
        Role::User,
    );
    PostgresIdentityStore::new(pool.clone())
        .insert(identity.clone())
        .await
        .unwrap();

    (tenant, identity)
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn identity_email_is_unique_per_tenant() {
    let (_container, pool) = postgres().await;
    let (tenant, _) = seeded(&pool).await;
    let store = PostgresIdentityStore::new(pool.clone());

    let duplicate = Identity::new(
        tenant.id,
        Email::parse("Alice@Example.com").unwrap(),
        None,
        Role::Viewer,
    );
    assert_eq!(
        store.insert(duplicate).await,
        Err(IdentityStoreError::DuplicateIdentity)
    );

    let other_tenant = Tenant::new("Globex", "globex");
    PostgresTenantStore::new(pool.clone())
        .insert(other_tenant.clone())
        .await
        .unwrap();
    let elsewhere = Identity::new(
        other_tenant.id,
        Email::parse("alice@example.com").unwrap(),
        None,
        Role::User,
    );
    assert!(store.insert(elsewhere).await.is_ok());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn identity_round_trips_and_updates() {
    let (_container, pool) = postgres().await;
    let (tenant, mut identity) = seeded(&pool).await;
    let store = PostgresIdentityStore::new(pool);

    let found = store
        .get_by_email_in_tenant(tenant.id, &identity.email)
        .await
        .unwrap();
    assert_eq!(found.id, identity.id);
    assert!(!found.has_password());

    identity.pending_email = Some(Email::parse("new@example.com").unwrap());
    identity.email_verified_at = Some(chrono::Utc::now());
    store.update(&identity).await.unwrap();

    let updated = store.get_by_id(identity.id).await.unwrap();
    assert!(updated.is_email_verified());
    assert_eq!(updated.pending_email, identity.pending_email);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn token_consume_is_single_use_under_concurrency() {
    let (_container, pool) = postgres().await;
    let (_, identity) = seeded(&pool).await;
    let ledger = Arc::new(PostgresTokenLedger::new(pool));

    let value = ledger
        .create(identity.id, TokenKind::MagicLink, TimeDelta::minutes(15))
        .await
        .unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let ledger = ledger.clone();
        let value = value.clone();
        tasks.spawn(async move { ledger.consume(&value).await });
    }

    let mut successes = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(token) => {
                assert_eq!(token.owner_id, identity.id);
                successes += 1;
            }
            Err(e) => assert_eq!(e, TokenLedgerError::NotFound),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn expired_tokens_and_superseded_tokens_are_not_found() {
    let (_container, pool) = postgres().await;
    let (_, identity) = seeded(&pool).await;
    let ledger = PostgresTokenLedger::new(pool);

    let expired = ledger
        .create(identity.id, TokenKind::PasswordReset, TimeDelta::seconds(-1))
        .await
        .unwrap();
    assert_eq!(
        ledger.consume(&expired).await.unwrap_err(),
        TokenLedgerError::NotFound
    );

    let superseded = ledger
        .create(identity.id, TokenKind::MagicLink, TimeDelta::minutes(15))
        .await
        .unwrap();
    let removed = ledger
        .delete_by_owner_and_type(identity.id, TokenKind::MagicLink)
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(
        ledger.consume(&superseded).await.unwrap_err(),
        TokenLedgerError::NotFound
    );

    assert_eq!(ledger.purge_unusable().await.unwrap(), 1);
}
