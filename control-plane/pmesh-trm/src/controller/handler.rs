use tracing::info;

use crate::controller::baseline::{Resolution, build_override, locate_baseline};
use crate::controller::lifecycle::LifecycleTracker;
use crate::controller::ownership::{self, OwnerRef};
use crate::crd::preview_env::{LifecycleStatus, ResourceStatus};
use crate::errors::RoutingError;
use crate::store::PolicyStore;

/// Construction parameters for a handler, one per reconcile invocation.
pub struct HandlerSpec {
    /// The preview environment this handler works for
    pub owner: OwnerRef,
    /// Namespace holding both baselines and overrides
    pub namespace: String,
    /// Unique name of the environment; prefixes every override-policy name
    pub unique_name: String,
    /// Version name given to override subsets
    pub unique_version: String,
    /// Label key that identifies a workload version
    pub version_label: String,
    /// Version that receives default-route traffic
    pub default_version: String,
    /// Hosts whose routing this environment overrides, in input order
    pub service_hosts: Vec<String>,
}

/// Drives the per-host reconciliation loop for one preview environment:
/// confirms or creates a version-scoped override policy per service host,
/// tracking lifecycle along the way.
pub struct TrafficPolicyHandler<S> {
    spec: HandlerSpec,
    store: S,
    tracker: LifecycleTracker,
    active_hosts: Vec<String>,
}

impl<S: PolicyStore> TrafficPolicyHandler<S> {
    pub fn new(spec: HandlerSpec, store: S) -> Self {
        Self {
            spec,
            store,
            tracker: LifecycleTracker::new(),
            active_hosts: Vec::new(),
        }
    }

    /// Process every configured host in order: confirm an existing override
    /// or create one from its baseline. A host without a default-version
    /// baseline goes to the ignored set; store failures abort the cycle
    /// immediately, leaving earlier creations in place (the existing-policy
    /// check makes the retry idempotent). Ends with the at-least-one-active-
    /// host invariant check.
    pub async fn handle(&mut self) -> Result<(), RoutingError> {
        self.active_hosts.clear();
        self.tracker.reset_records();

        for service_host in self.spec.service_hosts.clone() {
            let policy_name = self.policy_name(&service_host);
            let found = self
                .store
                .get(&self.spec.namespace, &policy_name)
                .await
                .map_err(|source| RoutingError::Lookup {
                    host: service_host.clone(),
                    source,
                })?;
            match found {
                Some(_) => self.active_hosts.push(service_host),
                None => {
                    self.create_missing_policy(&policy_name, &service_host)
                        .await?
                }
            }
        }

        if self.active_hosts.is_empty() {
            return Err(RoutingError::NoActiveHosts(
                self.spec.unique_name.clone(),
            ));
        }

        Ok(())
    }

    /// Second, independent pass reporting per-host lifecycle. A host in the
    /// ignored set reports IgnoredMissing instead of Missing, so ignored
    /// reporting is only meaningful once `handle` has run on this instance.
    pub async fn get_status(
        &self,
    ) -> Result<Vec<ResourceStatus>, RoutingError> {
        let mut statuses = Vec::new();
        for service_host in &self.spec.service_hosts {
            let policy_name = self.policy_name(service_host);
            let found = self
                .store
                .get(&self.spec.namespace, &policy_name)
                .await
                .map_err(|source| RoutingError::Lookup {
                    host: service_host.clone(),
                    source,
                })?;
            let status = match found {
                Some(_) => LifecycleStatus::Running,
                None if self.tracker.is_ignored(service_host) => {
                    LifecycleStatus::IgnoredMissing
                }
                None => LifecycleStatus::Missing,
            };
            statuses.push(ResourceStatus {
                name: policy_name,
                namespace: self.spec.namespace.clone(),
                status,
            });
        }
        Ok(statuses)
    }

    /// Hosts confirmed active this invocation, in input order.
    pub fn active_hosts(&self) -> &[String] {
        &self.active_hosts
    }

    /// Hosts whose baseline could not be located this cycle.
    pub fn ignored_hosts(&self) -> &[String] {
        self.tracker.ignored_hosts()
    }

    /// Best-effort interim records made during the last `handle` invocation.
    pub fn interim_records(&self) -> &[ResourceStatus] {
        self.tracker.records()
    }

    /// Deterministic override-policy name for a host.
    pub fn policy_name(&self, service_host: &str) -> String {
        format!("{}-{}", self.spec.unique_name, service_host)
    }

    async fn create_missing_policy(
        &mut self,
        policy_name: &str,
        service_host: &str,
    ) -> Result<(), RoutingError> {
        self.tracker.record(
            policy_name,
            &self.spec.namespace,
            LifecycleStatus::Initializing,
        );

        let resolution = locate_baseline(
            &self.store,
            &self.spec.namespace,
            service_host,
            &self.spec.version_label,
            &self.spec.default_version,
        )
        .await
        .map_err(|source| RoutingError::Lookup {
            host: service_host.to_string(),
            source,
        })?;

        let baseline = match resolution {
            Resolution::Found(baseline) => baseline,
            Resolution::IgnorableMissing => {
                self.tracker.ignore(service_host);
                info!(
                    host = service_host,
                    "added host to ignored-missing set"
                );
                return Ok(());
            }
        };

        let mut policy = build_override(
            &baseline,
            policy_name,
            &self.spec.namespace,
            &self.spec.version_label,
            &self.spec.unique_version,
        );
        ownership::add_owner(&self.spec.owner, &mut policy);

        info!(
            policy = policy_name,
            host = service_host,
            "deploying newly created traffic policy"
        );
        self.store.create(&policy).await.map_err(|source| {
            RoutingError::Create {
                host: service_host.to_string(),
                source,
            }
        })?;
        self.active_hosts.push(service_host.to_string());
        Ok(())
    }
}
