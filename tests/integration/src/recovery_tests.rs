//! Partial failures leave metadata matching the completed work

use bulk_core::{ChangeKind, CheckoutOptions, SyncEngine};
use bulk_http::Method;
use bulk_test_utils::{FakeRemote, TestCheckout};
use pretty_assertions::assert_eq;
use serde_json::json;

fn setup(ids: &[&str]) -> (TestCheckout, FakeRemote) {
    let checkout = TestCheckout::new();
    let remote = FakeRemote::new();
    for id in ids {
        remote.set_resource(id, json!({"id": id}));
    }
    SyncEngine::init(
        Box::new(checkout.store()),
        Box::new(remote.clone()),
        CheckoutOptions {
            url: remote.listing_url(),
            ..CheckoutOptions::default()
        },
    )
    .unwrap();
    (checkout, remote)
}

fn open(checkout: &TestCheckout, remote: &FakeRemote) -> SyncEngine {
    SyncEngine::open(Box::new(checkout.store()), Box::new(remote.clone())).unwrap()
}

#[test]
fn failed_pull_is_retried_by_next_pull() {
    let (checkout, remote) = setup(&["a", "b", "c"]);
    for id in ["a", "b", "c"] {
        remote.set_resource(id, json!({"id": id, "rev": 2}));
    }
    remote.fail_next(Method::Get, "b", 500);

    let report = open(&checkout, &remote).pull().unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(checkout.json("a.json")["rev"], json!(2));
    assert_eq!(checkout.json("b.json").get("rev"), None);
    assert_eq!(checkout.json("c.json")["rev"], json!(2));

    // Metadata on disk still marks b as behind.
    let status = open(&checkout, &remote).status().unwrap();
    assert_eq!(status.remote.len(), 1);
    assert_eq!(status.remote[0].path(), "b.json");

    let report = open(&checkout, &remote).pull().unwrap();
    assert!(report.is_success());
    assert_eq!(checkout.json("b.json")["rev"], json!(2));
}

#[test]
fn failed_push_stays_visible_until_retried() {
    let (checkout, remote) = setup(&["a", "b"]);
    checkout.write("a.json", r#"{"id": "a", "local": true}"#);
    checkout.write("b.json", r#"{"id": "b", "local": true}"#);
    remote.fail_next(Method::Put, "a", 503);

    let report = open(&checkout, &remote).push().unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].path, "a.json");

    let status = open(&checkout, &remote).status().unwrap();
    assert_eq!(status.local.len(), 1);
    assert_eq!(status.local[0].path(), "a.json");
    assert_eq!(status.local[0].kind, ChangeKind::Modified);
    assert!(status.remote.is_empty());

    let report = open(&checkout, &remote).push().unwrap();
    assert!(report.is_success(), "{:?}", report.errors);
    assert_eq!(remote.resource("a"), Some(json!({"id": "a", "local": true})));
    assert!(open(&checkout, &remote).status().unwrap().is_clean());
}

#[test]
fn failed_delete_keeps_record() {
    let (checkout, remote) = setup(&["a"]);
    checkout.remove("a.json");
    remote.fail_next(Method::Delete, "a", 500);

    let report = open(&checkout, &remote).push().unwrap();

    assert_eq!(report.errors.len(), 1);
    let engine = open(&checkout, &remote);
    assert!(engine.meta().files.contains_key("a.json"));
    assert_eq!(remote.resource("a"), Some(json!({"id": "a"})));
}

#[test]
fn accepted_delete_survives_cache_cleanup_failure() {
    let (checkout, remote) = setup(&["a", "b"]);
    checkout.remove("b.json");
    // A directory in place of the snapshot makes its removal fail.
    let cache = checkout.path(".restbulk/cache/b.json");
    std::fs::remove_file(&cache).unwrap();
    std::fs::create_dir_all(cache.join("stuck")).unwrap();

    let report = open(&checkout, &remote).push().unwrap();

    assert!(report.is_success(), "{:?}", report.errors);
    assert_eq!(remote.resource("b"), None);
    let mut engine = open(&checkout, &remote);
    assert!(!engine.meta().files.contains_key("b.json"));
    assert!(engine.status().unwrap().is_clean());
}
