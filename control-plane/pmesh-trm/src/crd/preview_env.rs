use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "pmesh.io",
    version = "v1alpha1",
    kind = "PreviewEnv",
    plural = "previewenvs",
    namespaced,
    status = "PreviewEnvStatus"
)]
pub struct PreviewEnvSpec {
    /// Version name applied to the subsets created for this environment
    pub version: String,
    /// Service hostnames whose routing gets a version-scoped override,
    /// processed in the order given here
    pub service_hosts: Vec<String>,
    /// Label key that identifies a workload version (operator default applies
    /// when omitted)
    pub version_label: Option<String>,
    /// Version that receives default-route traffic (operator default applies
    /// when omitted)
    pub default_version: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
pub struct PreviewEnvStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Per-policy lifecycle entries, one per configured service host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<ResourceStatus>>,
}

/// One line of the status report consumed by the external status aggregator.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
pub struct ResourceStatus {
    pub name: String,
    pub namespace: String,
    pub status: LifecycleStatus,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum LifecycleStatus {
    Missing,
    Initializing,
    Running,
    IgnoredMissing,
}
