use async_trait::async_trait;
use kube::ResourceExt;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{PolicyStore, StoreError, StoreResult};
use crate::crd::traffic_policy::TrafficPolicy;

/// In-memory `PolicyStore` used by tests. Backed by a `Vec` so list order
/// is insertion order.
#[derive(Clone, Default)]
pub struct MemoryPolicyStore {
    store: Arc<RwLock<Vec<TrafficPolicy>>>,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a policy without the create-path uniqueness check.
    pub async fn insert(&self, policy: TrafficPolicy) {
        self.store.write().await.push(policy);
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<Option<TrafficPolicy>> {
        let store = self.store.read().await;
        Ok(store
            .iter()
            .find(|p| {
                p.namespace().as_deref() == Some(namespace)
                    && p.name_any() == name
            })
            .cloned())
    }

    async fn list(&self, namespace: &str) -> StoreResult<Vec<TrafficPolicy>> {
        let store = self.store.read().await;
        Ok(store
            .iter()
            .filter(|p| p.namespace().as_deref() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn create(&self, policy: &TrafficPolicy) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let namespace = policy.namespace().unwrap_or_default();
        let name = policy.name_any();
        if store.iter().any(|p| {
            p.namespace().unwrap_or_default() == namespace
                && p.name_any() == name
        }) {
            return Err(StoreError::AlreadyExists(format!(
                "{}/{}",
                namespace, name
            )));
        }
        store.push(policy.clone());
        Ok(())
    }
}
