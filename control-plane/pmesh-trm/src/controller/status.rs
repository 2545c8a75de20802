use crate::crd::preview_env::{
    LifecycleStatus, PreviewEnvStatus, ResourceStatus,
};
use crate::errors::RoutingError;

/// Owner status derived from one reconciliation pass.
pub fn from_routes(
    now: String,
    generation: Option<i64>,
    routes: Vec<ResourceStatus>,
) -> PreviewEnvStatus {
    let total = routes.len();
    let running = routes
        .iter()
        .filter(|r| r.status == LifecycleStatus::Running)
        .count();
    let (phase, message) = if running == total {
        ("Running", format!("all {} service hosts routed", total))
    } else {
        ("Degraded", format!("{} of {} service hosts routed", running, total))
    };
    PreviewEnvStatus {
        phase: Some(phase.to_string()),
        message: Some(message),
        observed_generation: generation,
        last_updated: Some(now),
        routes: Some(routes),
    }
}

/// Status for a cycle that aborted partway: Degraded, carrying whatever
/// interim records the pass produced before failing.
pub fn from_failure(
    now: String,
    generation: Option<i64>,
    error: &RoutingError,
    records: Vec<ResourceStatus>,
) -> PreviewEnvStatus {
    PreviewEnvStatus {
        phase: Some("Degraded".to_string()),
        message: Some(error.to_string()),
        observed_generation: generation,
        last_updated: Some(now),
        routes: if records.is_empty() {
            None
        } else {
            Some(records)
        },
    }
}
