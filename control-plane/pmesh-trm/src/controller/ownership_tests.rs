#[cfg(test)]
mod tests {
    use kube::ResourceExt;

    use crate::controller::ownership::{
        OWNER_ANNOTATION, OwnerRef, PolicyEvent, add_owner, contains_owner,
        decode_owners, fan_out, remove_owner,
    };
    use crate::crd::traffic_policy::{TrafficPolicy, TrafficPolicySpec};

    fn policy() -> TrafficPolicy {
        TrafficPolicy::new(
            "some-policy",
            TrafficPolicySpec {
                host: "svc".into(),
                subsets: vec![],
            },
        )
    }

    fn owner(ns: &str, name: &str) -> OwnerRef {
        OwnerRef::new(ns, name)
    }

    #[test]
    fn add_owner_is_idempotent() {
        let mut p = policy();
        let o = owner("team-a", "env-1");
        add_owner(&o, &mut p);
        add_owner(&o, &mut p);
        assert_eq!(
            p.annotations().get(OWNER_ANNOTATION).unwrap(),
            "team-a/env-1"
        );
        assert_eq!(decode_owners(&p), vec![o]);
    }

    #[test]
    fn add_second_owner_appends_in_order() {
        let mut p = policy();
        add_owner(&owner("team-a", "env-1"), &mut p);
        add_owner(&owner("team-b", "env-2"), &mut p);
        assert_eq!(
            p.annotations().get(OWNER_ANNOTATION).unwrap(),
            "team-a/env-1,team-b/env-2"
        );
    }

    #[test]
    fn remove_owner_is_idempotent_and_keeps_order() {
        let mut p = policy();
        add_owner(&owner("team-a", "env-1"), &mut p);
        add_owner(&owner("team-b", "env-2"), &mut p);
        add_owner(&owner("team-c", "env-3"), &mut p);
        remove_owner(&owner("team-b", "env-2"), &mut p);
        remove_owner(&owner("team-b", "env-2"), &mut p);
        assert_eq!(
            p.annotations().get(OWNER_ANNOTATION).unwrap(),
            "team-a/env-1,team-c/env-3"
        );
    }

    #[test]
    fn removing_last_owner_leaves_empty_value() {
        let mut p = policy();
        let o = owner("team-a", "env-1");
        add_owner(&o, &mut p);
        remove_owner(&o, &mut p);
        assert_eq!(p.annotations().get(OWNER_ANNOTATION).unwrap(), "");
        assert!(decode_owners(&p).is_empty());
    }

    #[test]
    fn remove_from_unannotated_policy_is_noop() {
        let mut p = policy();
        remove_owner(&owner("team-a", "env-1"), &mut p);
        assert!(p.annotations().get(OWNER_ANNOTATION).is_none());
    }

    #[test]
    fn contains_owner_checks_exact_token() {
        let mut p = policy();
        add_owner(&owner("team-a", "env-1"), &mut p);
        assert!(contains_owner(&owner("team-a", "env-1"), &p));
        assert!(!contains_owner(&owner("team-a", "env-10"), &p));
        assert!(!contains_owner(&owner("team-b", "env-1"), &p));
    }

    #[test]
    fn decode_skips_empty_and_malformed_tokens() {
        let mut p = policy();
        p.annotations_mut().insert(
            OWNER_ANNOTATION.to_string(),
            "team-a/env-1,,malformed,team-b/env-2,/,team-a/env-1".to_string(),
        );
        let owners = decode_owners(&p);
        assert_eq!(
            owners,
            vec![owner("team-a", "env-1"), owner("team-b", "env-2")]
        );
    }

    #[test]
    fn decode_without_annotation_is_empty() {
        assert!(decode_owners(&policy()).is_empty());
    }

    #[test]
    fn fan_out_update_unions_old_and_new() {
        let mut old = policy();
        add_owner(&owner("team-a", "env-1"), &mut old);
        add_owner(&owner("team-b", "env-2"), &mut old);
        let mut new = policy();
        add_owner(&owner("team-b", "env-2"), &mut new);
        add_owner(&owner("team-c", "env-3"), &mut new);

        let owners = fan_out(PolicyEvent::Updated {
            old: &old,
            new: &new,
        });
        assert_eq!(owners.len(), 3);
        // the owner removed by this update is still triggered once
        assert!(owners.contains(&owner("team-a", "env-1")));
        assert!(owners.contains(&owner("team-b", "env-2")));
        assert!(owners.contains(&owner("team-c", "env-3")));
    }

    #[test]
    fn fan_out_single_snapshot_events_decode_one_object() {
        let mut p = policy();
        add_owner(&owner("team-a", "env-1"), &mut p);
        assert_eq!(
            fan_out(PolicyEvent::Created(&p)),
            vec![owner("team-a", "env-1")]
        );
        assert_eq!(
            fan_out(PolicyEvent::Deleted(&p)),
            vec![owner("team-a", "env-1")]
        );
    }

    #[test]
    fn fan_out_unannotated_object_triggers_nothing() {
        let p = policy();
        assert!(fan_out(PolicyEvent::Created(&p)).is_empty());
    }
}
