use super::*;
use appprotect_controller_k8s_api::{DynamicObject, ResourceExt, Time};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};


#[rstest]
#[case::policy(ResourceKind::Policy, json!({ "spec": { "policy": { "name": "default" } } }))]
#[case::log_conf(ResourceKind::LogConf, json!({ "spec": { "content": {}, "filter": {} } }))]
#[case::user_sig(ResourceKind::UserSig, json!({ "spec": { "signatures": [] } }))]
#[case::dos_policy(
    ResourceKind::DosPolicy,
    json!({
        "spec": {
            "mitigation_mode": "standard",
            "use_automation_tools_detection": "on",
            "signatures": "on",
            "bad_actors": "on",
        }
    })
)]
#[case::dos_log_conf(ResourceKind::DosLogConf, json!({ "spec": { "content": {}, "filter": {} } }))]
fn add_valid(#[case] kind: ResourceKind, #[case] data: Value) {
    let mut store = Store::new(Subsystem::AppProtect);

    let updates = store.add_or_update(kind, mk_obj(kind, "ns-0", "res-0", data.clone()));
    assert_eq!(
        summarize(&updates),
        vec![(Operation::AddOrUpdate, kind, "res-0".to_string())]
    );
    assert!(updates.problems.is_empty());
    assert!(updates.changes[0].resource.is_valid());

    let key = ResourceKey::new("ns-0", "res-0");
    assert_eq!(store.get(kind, &key).unwrap().data, data);
    assert_eq!(store.keys(kind), vec![key]);
}

#[rstest]
#[case::policy(ResourceKind::Policy, json!({ "spec": {} }), "Required field spec.policy not found")]
#[case::policy_wrong_shape(
    ResourceKind::Policy,
    json!({ "spec": { "policy": [] } }),
    "Error checking for required field spec.policy: .spec.policy accessor error: value is of the \
     type sequence, expected map"
)]
#[case::log_conf(
    ResourceKind::LogConf,
    json!({ "spec": { "content": {} } }),
    "Required field spec.filter not found"
)]
#[case::user_sig(
    ResourceKind::UserSig,
    json!({ "spec": { "tag": "t1" } }),
    "Required field spec.signatures not found"
)]
#[case::dos_policy(
    ResourceKind::DosPolicy,
    json!({
        "spec": {
            "mitigation_mode": "standard",
            "use_automation_tools_detection": "on",
            "signatures": "on",
        }
    }),
    "Required field spec.bad_actors not found"
)]
#[case::dos_log_conf(
    ResourceKind::DosLogConf,
    json!({ "spec": { "filter": {} } }),
    "Required field spec.content not found"
)]
fn add_invalid(#[case] kind: ResourceKind, #[case] data: Value, #[case] detail: &str) {
    let mut store = Store::new(Subsystem::AppProtect);

    let updates = store.add_or_update(kind, mk_obj(kind, "ns-0", "res-0", data));
    assert_eq!(
        summarize(&updates),
        vec![(Operation::Delete, kind, "res-0".to_string())]
    );
    assert_eq!(
        updates.changes[0].resource.error(),
        Some(Reason::ValidationFailed)
    );
    assert_eq!(updates.problems.len(), 1);
    assert_eq!(updates.problems[0].reason, REJECTED);
    assert_eq!(
        updates.problems[0].message,
        format!("Error validating {} res-0: {detail}", kind.display_name())
    );
    assert_eq!(updates.problems[0].obj.name_any(), "res-0");

    // Lookups report only the fixed reason.
    let key = ResourceKey::new("ns-0", "res-0");
    let err = store.get(kind, &key).unwrap_err();
    assert_eq!(err, LookupError::Invalid(Reason::ValidationFailed));
    assert_eq!(err.to_string(), "Validation Failed");
    assert_eq!(store.keys(kind), vec![key]);
}

#[test]
fn add_is_idempotent() {
    let mut store = Store::new(Subsystem::AppProtect);
    let obj = mk_obj(
        ResourceKind::LogConf,
        "ns-0",
        "log-0",
        json!({ "spec": { "content": { "format": "default" }, "filter": {} } }),
    );

    let first = store.add_or_update(ResourceKind::LogConf, obj.clone());
    let second = store.add_or_update(ResourceKind::LogConf, obj.clone());
    assert_eq!(summarize(&first), summarize(&second));
    assert!(second.problems.is_empty());

    let key = ResourceKey::new("ns-0", "log-0");
    assert_eq!(store.keys(ResourceKind::LogConf), vec![key.clone()]);
    assert_eq!(
        store.get(ResourceKind::LogConf, &key).unwrap().data,
        obj.data
    );
}

#[rstest]
#[case::policy(ResourceKind::Policy)]
#[case::log_conf(ResourceKind::LogConf)]
#[case::user_sig(ResourceKind::UserSig)]
#[case::dos_policy(ResourceKind::DosPolicy)]
#[case::dos_log_conf(ResourceKind::DosLogConf)]
fn delete(#[case] kind: ResourceKind) {
    let mut store = Store::new(Subsystem::AppProtect);
    let key = ResourceKey::new("ns-0", "res-0");

    assert!(store.delete(kind, &key).is_empty());

    // Invalid resources are deleted like any other.
    store.add_or_update(kind, mk_obj(kind, "ns-0", "res-0", json!({})));
    let updates = store.delete(kind, &key);
    assert_eq!(
        summarize(&updates),
        vec![(Operation::Delete, kind, "res-0".to_string())]
    );
    assert!(updates.problems.is_empty());

    let err = store.get(kind, &key).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        format!("{} ns-0/res-0 not found", kind.display_name())
    );
    assert!(store.keys(kind).is_empty());
    assert!(store.delete(kind, &key).is_empty());
}

#[test]
fn valid_to_invalid_to_valid() {
    let mut store = Store::new(Subsystem::AppProtect);
    let key = ResourceKey::new("ns-0", "pol-0");
    let valid = json!({ "spec": { "policy": { "enforcementMode": "blocking" } } });

    let updates = store.add_or_update(
        ResourceKind::Policy,
        mk_obj(ResourceKind::Policy, "ns-0", "pol-0", valid.clone()),
    );
    assert_eq!(updates.changes[0].op, Operation::AddOrUpdate);

    let updates = store.add_or_update(
        ResourceKind::Policy,
        mk_obj(ResourceKind::Policy, "ns-0", "pol-0", json!({ "spec": {} })),
    );
    assert_eq!(updates.changes[0].op, Operation::Delete);
    assert_eq!(updates.problems.len(), 1);
    assert_eq!(
        store.get(ResourceKind::Policy, &key).unwrap_err(),
        LookupError::Invalid(Reason::ValidationFailed)
    );

    let updates = store.add_or_update(
        ResourceKind::Policy,
        mk_obj(ResourceKind::Policy, "ns-0", "pol-0", valid.clone()),
    );
    assert_eq!(updates.changes[0].op, Operation::AddOrUpdate);
    assert!(updates.problems.is_empty());
    assert_eq!(store.get(ResourceKind::Policy, &key).unwrap().data, valid);
}

#[test]
fn dos_subsystem_requires_only_a_spec() {
    let bare = mk_obj(
        ResourceKind::DosPolicy,
        "ns-0",
        "dos-0",
        json!({ "spec": { "mitigation_mode": "standard" } }),
    );

    let mut dos = Store::new(Subsystem::AppProtectDos);
    let updates = dos.add_or_update(ResourceKind::DosPolicy, bare.clone());
    assert_eq!(updates.changes[0].op, Operation::AddOrUpdate);
    assert!(updates.problems.is_empty());

    let mut app_protect = Store::new(Subsystem::AppProtect);
    let updates = app_protect.add_or_update(ResourceKind::DosPolicy, bare);
    assert_eq!(updates.changes[0].op, Operation::Delete);
    assert_eq!(
        updates.problems[0].message,
        "Error validating App Protect Dos Policy dos-0: Required field \
         spec.use_automation_tools_detection not found"
    );

    let updates = dos.add_or_update(
        ResourceKind::DosPolicy,
        mk_obj(ResourceKind::DosPolicy, "ns-0", "dos-1", json!({ "spec": "on" })),
    );
    assert_eq!(updates.changes[0].op, Operation::Delete);
    assert_eq!(
        updates.problems[0].message,
        "Error validating App Protect Dos Policy dos-1: Error checking for required field spec: \
         .spec accessor error: value is of the type string, expected map"
    );
}

#[test]
fn invalid_timestamp() {
    let mut store = Store::new(Subsystem::AppProtectDos);
    let obj = mk_obj(
        ResourceKind::DosPolicy,
        "ns-0",
        "dos-0",
        json!({
            "spec": {
                "policy": {
                    "signature-requirements": [
                        { "tag": "t1", "minRevisionDatetime": "2023-01-01T00:00:00Z" },
                        { "tag": "t2", "maxRevisionDatetime": "2023-13-01T00:00:00Z" },
                    ]
                }
            }
        }),
    );

    let updates = store.add_or_update(ResourceKind::DosPolicy, obj);
    assert_eq!(
        summarize(&updates),
        vec![(Operation::Delete, ResourceKind::DosPolicy, "dos-0".to_string())]
    );
    assert_eq!(updates.problems[0].reason, REJECTED);
    assert!(updates.problems[0]
        .message
        .starts_with("Error creating time requirements from dos-0: Error parsing time from maxRevisionDatetime"));

    let err = store
        .get(ResourceKind::DosPolicy, &ResourceKey::new("ns-0", "dos-0"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid timestamp");
}

#[test]
fn keys_are_scoped_by_namespace() {
    let mut store = Store::new(Subsystem::AppProtect);
    let data = json!({ "spec": { "content": {}, "filter": {} } });
    for ns in ["ns-1", "ns-0"] {
        store.add_or_update(
            ResourceKind::LogConf,
            mk_obj(ResourceKind::LogConf, ns, "log", data.clone()),
        );
    }

    assert_eq!(
        store.keys(ResourceKind::LogConf),
        vec![ResourceKey::new("ns-0", "log"), ResourceKey::new("ns-1", "log")]
    );
    assert!(store.keys(ResourceKind::DosLogConf).is_empty());

    let reference = "ns-1/log".parse::<ResourceKey>().unwrap();
    assert!(store.get(ResourceKind::LogConf, &reference).is_ok());
}

#[test]
fn invalid_input_leaves_other_resources_untouched() {
    let mut store = Store::new(Subsystem::AppProtect);
    let valid = json!({ "spec": { "content": {}, "filter": {} } });
    store.add_or_update(
        ResourceKind::LogConf,
        mk_obj(ResourceKind::LogConf, "ns-0", "log-a", valid.clone()),
    );

    let updates = store.add_or_update(
        ResourceKind::LogConf,
        mk_obj(
            ResourceKind::LogConf,
            "ns-0",
            "log-b",
            json!({ "spec": { "content": "bad" } }),
        ),
    );
    assert_eq!(
        summarize(&updates),
        vec![(Operation::Delete, ResourceKind::LogConf, "log-b".to_string())]
    );
    assert_eq!(updates.problems.len(), 1);
    assert_eq!(updates.problems[0].obj.name_any(), "log-b");

    let updates = store.add_or_update(
        ResourceKind::Policy,
        mk_obj(ResourceKind::Policy, "ns-0", "log-a", json!({ "spec": 42 })),
    );
    assert_eq!(
        summarize(&updates),
        vec![(Operation::Delete, ResourceKind::Policy, "log-a".to_string())]
    );
    assert_eq!(updates.problems.len(), 1);

    let key = ResourceKey::new("ns-0", "log-a");
    assert_eq!(store.get(ResourceKind::LogConf, &key).unwrap().data, valid);
    assert_eq!(
        store.keys(ResourceKind::LogConf),
        vec![key, ResourceKey::new("ns-0", "log-b")]
    );
}

// === helpers ===

fn mk_obj(kind: ResourceKind, ns: &str, name: &str, data: Value) -> DynamicObject {
    DynamicObject::new(name, &kind.api_resource())
        .within(ns)
        .data(data)
}

fn created_at(mut obj: DynamicObject, time: &str) -> DynamicObject {
    obj.metadata.creation_timestamp = Some(Time(time.parse().unwrap()));
    obj
}

fn summarize(updates: &Updates) -> Vec<(Operation, ResourceKind, String)> {
    updates
        .changes
        .iter()
        .map(|c| (c.op, c.resource.kind(), c.resource.obj().name_any()))
        .collect()
}
