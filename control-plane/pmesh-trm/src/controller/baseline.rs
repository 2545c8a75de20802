use std::collections::BTreeMap;

use kube::api::ObjectMeta;
use tracing::info;

use crate::crd::traffic_policy::{Subset, TrafficPolicy, TrafficPolicySpec};
use crate::store::{PolicyStore, StoreResult};

/// Outcome of a baseline lookup. A missing baseline is a distinguished
/// non-fatal result; the caller decides whether it is fatal.
pub enum Resolution {
    Found(TrafficPolicy),
    IgnorableMissing,
}

/// Find the policy carrying the default-version subset for `service_host`.
/// Candidates come from listing `namespace`; the first one whose declared
/// host matches and whose subsets carry `version_label == default_version`
/// wins. Correct inputs have at most one such candidate per host.
pub async fn locate_baseline<S>(
    store: &S,
    namespace: &str,
    service_host: &str,
    version_label: &str,
    default_version: &str,
) -> StoreResult<Resolution>
where
    S: PolicyStore + ?Sized,
{
    let candidates = store.list(namespace).await?;
    for candidate in candidates {
        let declared_ns =
            candidate.metadata.namespace.as_deref().unwrap_or(namespace);
        if !hosts_match(
            service_host,
            namespace,
            &candidate.spec.host,
            declared_ns,
        ) {
            continue;
        }
        if candidate.spec.subsets.iter().any(|s| {
            s.labels.get(version_label).map(String::as_str)
                == Some(default_version)
        }) {
            return Ok(Resolution::Found(candidate));
        }
    }
    info!(
        namespace,
        host = service_host,
        default_version,
        "no baseline policy with default version for host"
    );
    Ok(Resolution::IgnorableMissing)
}

/// Namespace-aware host equivalence: literal match, or short name on one
/// side matching `name.namespace` on the other, in either direction.
pub fn hosts_match(
    service_host: &str,
    service_ns: &str,
    declared_host: &str,
    declared_ns: &str,
) -> bool {
    if service_host == declared_host {
        return true;
    }
    if format!("{}.{}", service_host, service_ns) == declared_host {
        return true;
    }
    format!("{}.{}", declared_host, declared_ns) == service_host
}

/// Build a version-scoped override from a resolved baseline: same host,
/// exactly one subset keyed by the version label. Pure; the caller stamps
/// ownership and persists.
pub fn build_override(
    baseline: &TrafficPolicy,
    name: &str,
    namespace: &str,
    version_label: &str,
    unique_version: &str,
) -> TrafficPolicy {
    let subset = Subset {
        name: unique_version.to_string(),
        labels: BTreeMap::from([(
            version_label.to_string(),
            unique_version.to_string(),
        )]),
    };
    TrafficPolicy {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([(
                version_label.to_string(),
                unique_version.to_string(),
            )])),
            ..ObjectMeta::default()
        },
        spec: TrafficPolicySpec {
            host: baseline.spec.host.clone(),
            subsets: vec![subset],
        },
    }
}
