use std::sync::Arc;

use chrono::Utc;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use serde_json::json;
use tokio::time::Duration;
use tracing::{debug, info, instrument, trace};

use crate::controller::events::emit_route_event;
use crate::controller::handler::{HandlerSpec, TrafficPolicyHandler};
use crate::controller::ownership::{self, OwnerRef};
use crate::crd::preview_env::{PreviewEnv, PreviewEnvStatus};
use crate::crd::traffic_policy::TrafficPolicy;
use crate::store::k8s::KubePolicyStore;

use super::{ControllerContext, FINALIZER, ReconcileErr, into_internal};

#[instrument(skip_all, fields(ns = %obj.namespace().unwrap_or_else(|| "default".into()), name = %obj.name_any()))]
pub async fn reconcile(
    obj: Arc<PreviewEnv>,
    ctx: Arc<ControllerContext>,
) -> Result<Action, ReconcileErr> {
    let ns = obj.namespace().unwrap_or_else(|| "default".to_string());
    let name = obj.name_any();
    let uid = obj.meta().uid.clone();

    let env_api: Api<PreviewEnv> = Api::namespaced(ctx.client.clone(), &ns);
    let owner = OwnerRef::new(ns.clone(), name.clone());

    // Handle delete: detach from owned policies then remove finalizer. The
    // policies themselves are never deleted here; external garbage
    // collection reacts to the emptied ownership annotation.
    if obj.meta().deletion_timestamp.is_some() {
        info!(%ns, %name, "reconcile: deletion timestamp detected; detaching owned policies");
        detach_owner(&ctx.client, &ns, &owner).await?;
        if obj
            .meta()
            .finalizers
            .as_ref()
            .map(|f| f.iter().any(|x| x == FINALIZER))
            .unwrap_or(false)
        {
            info!(%ns, %name, "reconcile: removing finalizer");
            let finals = obj
                .meta()
                .finalizers
                .clone()
                .unwrap_or_default()
                .into_iter()
                .filter(|f| f != FINALIZER)
                .collect::<Vec<_>>();
            let patch = json!({"metadata": {"finalizers": finals}});
            let _ = env_api
                .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
                .map_err(into_internal)?;
        }
        return Ok(Action::await_change());
    }

    // Ensure finalizer
    if !obj
        .meta()
        .finalizers
        .as_ref()
        .map(|f| f.iter().any(|x| x == FINALIZER))
        .unwrap_or(false)
    {
        info!(%ns, %name, "reconcile: adding finalizer");
        let mut finals = obj.meta().finalizers.clone().unwrap_or_default();
        finals.push(FINALIZER.to_string());
        let patch = json!({"metadata": {"finalizers": finals}});
        let _ = env_api
            .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(into_internal)?;
    }

    let spec = &obj.spec;
    let version_label = spec
        .version_label
        .clone()
        .unwrap_or_else(|| ctx.cfg.version_label.clone());
    let default_version = spec
        .default_version
        .clone()
        .unwrap_or_else(|| ctx.cfg.default_version.clone());

    let mut handler = TrafficPolicyHandler::new(
        HandlerSpec {
            owner,
            namespace: ns.clone(),
            unique_name: format!("{}-{}", ns, name),
            unique_version: spec.version.clone(),
            version_label,
            default_version,
            service_hosts: spec.service_hosts.clone(),
        },
        KubePolicyStore::new(ctx.client.clone()),
    );

    if let Err(err) = handler.handle().await {
        // Best-effort: surface the interim records so a failed cycle still
        // reports which policies were being initialized when it aborted.
        let now = Utc::now().to_rfc3339();
        let status_obj = super::status::from_failure(
            now,
            obj.meta().generation,
            &err,
            handler.interim_records().to_vec(),
        );
        let status = json!({ "status": status_obj });
        let _ = env_api
            .patch_status(
                &name,
                &PatchParams::default(),
                &Patch::Merge(&status),
            )
            .await;
        return Err(err.into());
    }
    let routes = handler.get_status().await?;
    info!(%ns, %name, active = handler.active_hosts().len(), ignored = handler.ignored_hosts().len(), "reconcile: routing pass complete");

    emit_route_event(
        &ctx.event_recorder,
        &ns,
        &name,
        uid.as_deref(),
        handler.active_hosts().len(),
        spec.service_hosts.len(),
    )
    .await;

    // Update status only when it would change materially (ignore
    // timestamp-only churn)
    let now = Utc::now().to_rfc3339();
    let status_obj =
        super::status::from_routes(now, obj.meta().generation, routes);
    if should_patch_status(obj.status.as_ref(), &status_obj) {
        trace!(%ns, %name, "reconcile: status changed; patching status");
        let status = json!({ "status": status_obj });
        let _ = env_api
            .patch_status(
                &name,
                &PatchParams::default(),
                &Patch::Merge(&status),
            )
            .await
            .map_err(into_internal)?;
    } else {
        trace!(%ns, %name, "reconcile: status unchanged; skipping patch");
    }

    Ok(Action::requeue(Duration::from_secs(ctx.cfg.requeue_secs)))
}

/// Remove `owner` from the ownership annotation of every policy in `ns`
/// that carries it, merge-patching only the annotation.
#[instrument(skip_all, fields(ns = %ns, owner = %owner))]
async fn detach_owner(
    client: &kube::Client,
    ns: &str,
    owner: &OwnerRef,
) -> Result<(), ReconcileErr> {
    let api: Api<TrafficPolicy> = Api::namespaced(client.clone(), ns);
    let list = api
        .list(&ListParams::default())
        .await
        .map_err(into_internal)?;
    for mut policy in list {
        if !ownership::contains_owner(owner, &policy) {
            continue;
        }
        ownership::remove_owner(owner, &mut policy);
        let value = policy
            .annotations()
            .get(ownership::OWNER_ANNOTATION)
            .cloned()
            .unwrap_or_default();
        let policy_name = policy.name_any();
        info!(policy = %policy_name, "detaching owner from traffic policy");
        let patch = json!({"metadata": {"annotations": {ownership::OWNER_ANNOTATION: value}}});
        let _ = api
            .patch(&policy_name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(into_internal)?;
    }
    Ok(())
}

/// Compare two status objects for material differences, ignoring the
/// timestamp field that would otherwise cause patch churn every cycle.
fn should_patch_status(
    current: Option<&PreviewEnvStatus>,
    desired: &PreviewEnvStatus,
) -> bool {
    match current {
        None => {
            debug!("should_patch_status: no current status, patching");
            true
        }
        Some(cur) => {
            let differs = normalize_status(cur) != normalize_status(desired);
            if differs {
                debug!("should_patch_status: status differs, patching");
            } else {
                trace!("should_patch_status: status identical, skipping patch");
            }
            differs
        }
    }
}

fn normalize_status(s: &PreviewEnvStatus) -> serde_json::Value {
    let mut v = serde_json::to_value(s).unwrap_or_else(|_| json!({}));
    if let serde_json::Value::Object(ref mut map) = v {
        map.remove("last_updated");
    }
    v
}
