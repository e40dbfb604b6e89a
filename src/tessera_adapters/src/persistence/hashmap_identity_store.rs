use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use tessera_core::{Email, Identity, IdentityId, IdentityStore, IdentityStoreError, TenantId};

/// In-memory identity store. Uniqueness of `(tenant_id, email)` is checked
/// under the write lock, so concurrent inserts cannot both succeed.
#[derive(Default, Clone)]
pub struct HashMapIdentityStore {
    identities: Arc<RwLock<HashMap<IdentityId, Identity>>>,
}

impl HashMapIdentityStore {
    pub fn new() -> Self {
        Self {
            identities: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn email_taken(
    identities: &HashMap<IdentityId, Identity>,
    except: IdentityId,
    tenant_id: TenantId,
    email: &Email,
) -> bool {
    identities
        .values()
        .any(|other| other.id != except && other.tenant_id == tenant_id && &other.email == email)
}

#[async_trait::async_trait]
impl IdentityStore for HashMapIdentityStore {
    async fn insert(&self, identity: Identity) -> Result<(), IdentityStoreError> {
        let mut identities = self.identities.write().await;
        if identities.contains_key(&identity.id)
            || email_taken(&identities, identity.id, identity.tenant_id, &identity.email)
        {
            return Err(IdentityStoreError::DuplicateIdentity);
        }
        identities.insert(identity.id, identity);
        Ok(())
    }

    async fn get_by_id(&self, id: IdentityId) -> Result<Identity, IdentityStoreError> {
        let identities = self.identities.read().await;
        identities
            .get(&id)
            .cloned()
            .ok_or(IdentityStoreError::NotFound)
    }

    async fn get_by_email_in_tenant(
        &self,
        tenant_id: TenantId,
        email: &Email,
    ) -> Result<Identity, IdentityStoreError> {
        let identities = self.identities.read().await;
        identities
            .values()
            .find(|identity| identity.tenant_id == tenant_id && &identity.email == email)
            .cloned()
            .ok_or(IdentityStoreError::NotFound)
    }

    async fn update(&self, identity: &Identity) -> Result<(), IdentityStoreError> {
        let mut identities = self.identities.write().await;
        if email_taken(&identities, identity.id, identity.tenant_id, &identity.email) {
            return Err(IdentityStoreError::DuplicateIdentity);
        }
        let stored = identities
            .get_mut(&identity.id)
            .ok_or(IdentityStoreError::NotFound)?;

        *stored = identity.clone();
        Ok(())
    }
}
