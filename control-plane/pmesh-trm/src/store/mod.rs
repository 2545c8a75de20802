use async_trait::async_trait;

use crate::crd::traffic_policy::TrafficPolicy;

pub mod k8s;
pub mod memory;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Item already exists: {0}")]
    AlreadyExists(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Narrow capability contract over the cluster object store. The routing
/// core only ever needs point reads, namespace-scoped lists, and creates;
/// a missing object is an expected branch (`Ok(None)`), not an error.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<Option<TrafficPolicy>>;

    async fn list(&self, namespace: &str) -> StoreResult<Vec<TrafficPolicy>>;

    async fn create(&self, policy: &TrafficPolicy) -> StoreResult<()>;
}
