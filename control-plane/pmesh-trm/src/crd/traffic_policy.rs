use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "pmesh.io",
    version = "v1alpha1",
    kind = "TrafficPolicy",
    plural = "trafficpolicies",
    namespaced
)]
pub struct TrafficPolicySpec {
    /// Service hostname this policy routes for (short name or `name.namespace`)
    pub host: String,
    /// Named routing targets selected by pod labels. Baseline policies carry
    /// the default-version subset; override policies carry exactly one subset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsets: Vec<Subset>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default, PartialEq)]
pub struct Subset {
    pub name: String,
    /// Label key/values identifying the workload version behind this subset
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}
