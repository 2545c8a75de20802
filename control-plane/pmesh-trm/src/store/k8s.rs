use async_trait::async_trait;
use kube::Client;
use kube::api::{Api, ListParams, PostParams};

use super::{PolicyStore, StoreError, StoreResult};
use crate::crd::traffic_policy::TrafficPolicy;

/// `PolicyStore` backed by the cluster API server.
#[derive(Clone)]
pub struct KubePolicyStore {
    client: Client,
}

impl KubePolicyStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<TrafficPolicy> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl PolicyStore for KubePolicyStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<Option<TrafficPolicy>> {
        Ok(self.api(namespace).get_opt(name).await?)
    }

    async fn list(&self, namespace: &str) -> StoreResult<Vec<TrafficPolicy>> {
        let list = self.api(namespace).list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn create(&self, policy: &TrafficPolicy) -> StoreResult<()> {
        let namespace =
            policy.metadata.namespace.as_deref().unwrap_or("default");
        match self
            .api(namespace)
            .create(&PostParams::default(), policy)
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(ae)) if ae.code == 409 => {
                Err(StoreError::AlreadyExists(
                    policy.metadata.name.clone().unwrap_or_default(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }
}
