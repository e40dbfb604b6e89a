use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use tessera_core::{Tenant, TenantId, TenantStore, TenantStoreError};

#[derive(Default, Clone)]
pub struct HashMapTenantStore {
    tenants: Arc<RwLock<HashMap<TenantId, Tenant>>>,
}

impl HashMapTenantStore {
    pub fn new() -> Self {
        Self {
            tenants: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl TenantStore for HashMapTenantStore {
    async fn insert(&self, tenant: Tenant) -> Result<(), TenantStoreError> {
        let mut tenants = self.tenants.write().await;
        if tenants
            .values()
            .any(|other| other.subdomain == tenant.subdomain)
        {
            return Err(TenantStoreError::DuplicateSubdomain);
        }
        tenants.insert(tenant.id, tenant);
        Ok(())
    }

    async fn get_by_id(&self, id: TenantId) -> Result<Tenant, TenantStoreError> {
        let tenants = self.tenants.read().await;
        tenants.get(&id).cloned().ok_or(TenantStoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = HashMapTenantStore::new();
        let tenant = Tenant::new("Acme", "acme");

        store.insert(tenant.clone()).await.unwrap();

        assert_eq!(store.get_by_id(tenant.id).await.unwrap().name, "Acme");
        assert_eq!(
            store.get_by_id(TenantId::new()).await.unwrap_err(),
            TenantStoreError::NotFound
        );
    }

    #[tokio::test]
    async fn test_subdomain_unique() {
        let store = HashMapTenantStore::new();
        store.insert(Tenant::new("Acme", "acme")).await.unwrap();

        let result = store.insert(Tenant::new("Acme Two", "Acme")).await;

        assert_eq!(result, Err(TenantStoreError::DuplicateSubdomain));
    }
}
