use std::sync::Arc;

use envconfig::Envconfig;
use futures_util::StreamExt;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::{
    Client,
    api::Api,
    runtime::{
        Controller,
        controller::Action,
        events::{Recorder, Reporter},
        reflector::ObjectRef,
        watcher::Config,
    },
};
use tokio::time::Duration;
use tracing::{error, info};

use crate::config::TrmConfig;
use crate::crd::preview_env::PreviewEnv;
use crate::crd::traffic_policy::TrafficPolicy;
use crate::errors::RoutingError;

pub mod baseline;
pub mod events;
pub mod handler;
pub mod lifecycle;
pub mod ownership;
pub mod reconcile;
pub mod status;

#[cfg(test)]
mod ownership_tests;

pub(crate) const FINALIZER: &str = "pmesh.io/finalizer";

#[derive(thiserror::Error, Debug)]
pub enum ReconcileErr {
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Clone)]
pub struct ControllerContext {
    pub client: Client,
    pub cfg: TrmConfig,
    pub event_recorder: Recorder,
}

pub async fn run_controller(client: Client) -> anyhow::Result<()> {
    let envs: Api<PreviewEnv> = Api::all(client.clone());
    let policies: Api<TrafficPolicy> = Api::all(client.clone());
    let cfg = TrmConfig::init_from_env()?;
    let event_recorder = Recorder::new(
        client.clone(),
        Reporter {
            controller: "pmesh-trm".into(),
            instance: None,
        },
    );
    let ctx = Arc::new(ControllerContext {
        client,
        cfg,
        event_recorder,
    });

    // Policy changes fan out to every owner encoded on the object, so each
    // subscribed environment gets its own reconciliation trigger.
    Controller::new(envs, Config::default())
        .watches(policies, Config::default(), |policy| {
            ownership::decode_owners(&policy).into_iter().map(|owner| {
                ObjectRef::new(&owner.name).within(&owner.namespace)
            })
        })
        .run(reconcile::reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((_obj_ref, action)) => {
                    info!("reconciled: requeue={:?}", action)
                }
                Err(e) => error!(error = ?e, "reconcile error"),
            }
        })
        .await;

    Ok(())
}

pub(crate) fn into_internal<E: std::fmt::Display>(e: E) -> ReconcileErr {
    ReconcileErr::Internal(e.to_string())
}

fn error_policy(
    _obj: Arc<PreviewEnv>,
    _error: &ReconcileErr,
    ctx: Arc<ControllerContext>,
) -> Action {
    Action::requeue(Duration::from_secs(ctx.cfg.error_requeue_secs))
}

pub(crate) fn build_obj_ref(
    ns: &str,
    name: &str,
    uid: Option<&str>,
) -> ObjectReference {
    ObjectReference {
        api_version: Some("pmesh.io/v1alpha1".into()),
        kind: Some("PreviewEnv".into()),
        name: Some(name.into()),
        namespace: Some(ns.into()),
        uid: uid.map(|u| u.to_string()),
        ..Default::default()
    }
}
