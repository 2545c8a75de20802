use kube::runtime::events::{Event, EventType, Recorder};

use super::build_obj_ref;

pub const REASON_ROUTES_READY: &str = "RoutesReady";
pub const REASON_ROUTES_DEGRADED: &str = "RoutesDegraded";

/// Publish a routing outcome event on the owning environment. Warning-typed
/// when some configured hosts ended the cycle inactive.
pub async fn emit_route_event(
    recorder: &Recorder,
    ns: &str,
    name: &str,
    uid: Option<&str>,
    active: usize,
    total: usize,
) {
    let (type_, reason) = if active == total {
        (EventType::Normal, REASON_ROUTES_READY)
    } else {
        (EventType::Warning, REASON_ROUTES_DEGRADED)
    };
    let _ = recorder
        .publish(
            &Event {
                type_,
                reason: reason.into(),
                note: Some(format!(
                    "{} of {} service hosts active",
                    active, total
                )),
                action: "Reconcile".into(),
                secondary: None,
            },
            &build_obj_ref(ns, name, uid),
        )
        .await;
}
