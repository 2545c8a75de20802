use kube::ResourceExt;

use crate::crd::traffic_policy::TrafficPolicy;

/// Annotation naming the preview environments that own a traffic policy.
/// The value is a comma-separated list of `<namespace>/<name>` tokens in
/// insertion order, without duplicates.
pub const OWNER_ANNOTATION: &str = "pmesh.io/preview-envs";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OwnerRef {
    pub namespace: String,
    pub name: String,
}

impl OwnerRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    fn token(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

fn parse_token(token: &str) -> Option<OwnerRef> {
    let (namespace, name) = token.split_once('/')?;
    if namespace.is_empty() || name.is_empty() {
        return None;
    }
    Some(OwnerRef::new(namespace, name))
}

/// Owners encoded on `policy`, in annotation order. Empty and malformed
/// tokens are skipped rather than failing the whole decode; duplicates
/// collapse to the first occurrence.
pub fn decode_owners(policy: &TrafficPolicy) -> Vec<OwnerRef> {
    let Some(value) = policy.annotations().get(OWNER_ANNOTATION) else {
        return Vec::new();
    };
    let mut owners = Vec::new();
    for token in value.split(',') {
        if token.is_empty() {
            continue;
        }
        let Some(owner) = parse_token(token) else {
            continue;
        };
        if !owners.contains(&owner) {
            owners.push(owner);
        }
    }
    owners
}

/// Append `owner` to the ownership annotation; no-op if already present.
pub fn add_owner(owner: &OwnerRef, policy: &mut TrafficPolicy) {
    let token = owner.token();
    let annotations = policy.annotations_mut();
    let current = annotations
        .get(OWNER_ANNOTATION)
        .map(String::as_str)
        .unwrap_or("");
    if current.is_empty() {
        annotations.insert(OWNER_ANNOTATION.to_string(), token);
        return;
    }
    if current.split(',').any(|t| t == token) {
        return;
    }
    annotations.insert(
        OWNER_ANNOTATION.to_string(),
        format!("{},{}", current, token),
    );
}

/// Idempotent removal of `owner`. Removing the last owner leaves an empty
/// annotation value, which external garbage collection treats as orphaned.
// TODO: decide whether the key itself should be dropped once the last owner
// detaches; GC currently keys off the empty value.
pub fn remove_owner(owner: &OwnerRef, policy: &mut TrafficPolicy) {
    let token = owner.token();
    let annotations = policy.annotations_mut();
    let Some(current) = annotations.get(OWNER_ANNOTATION).cloned() else {
        return;
    };
    let remaining: Vec<&str> = current
        .split(',')
        .filter(|t| !t.is_empty() && *t != token)
        .collect();
    annotations.insert(OWNER_ANNOTATION.to_string(), remaining.join(","));
}

/// Whether `owner` is present in the ownership annotation.
pub fn contains_owner(owner: &OwnerRef, policy: &TrafficPolicy) -> bool {
    let token = owner.token();
    policy
        .annotations()
        .get(OWNER_ANNOTATION)
        .map(|v| v.split(',').any(|t| t == token))
        .unwrap_or(false)
}

/// A watch event over traffic policies, as delivered by the external watch
/// stream.
pub enum PolicyEvent<'a> {
    Created(&'a TrafficPolicy),
    Updated {
        old: &'a TrafficPolicy,
        new: &'a TrafficPolicy,
    },
    Deleted(&'a TrafficPolicy),
}

/// Reconciliation targets for a watch event: every owner subscribed on the
/// involved snapshot(s). Updates take the ordered union of old and new so
/// owners added or removed by the same update each get a trigger.
pub fn fan_out(event: PolicyEvent<'_>) -> Vec<OwnerRef> {
    match event {
        PolicyEvent::Created(policy) | PolicyEvent::Deleted(policy) => {
            decode_owners(policy)
        }
        PolicyEvent::Updated { old, new } => {
            let mut owners = decode_owners(new);
            for owner in decode_owners(old) {
                if !owners.contains(&owner) {
                    owners.push(owner);
                }
            }
            owners
        }
    }
}
