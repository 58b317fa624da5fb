//! Checkout lifecycle scenarios on a real directory
//!
//! Each test drives a full init / edit / push / pull cycle through an
//! on-disk store and an in-memory remote, reopening the checkout between
//! commands the way separate CLI invocations would.

use bulk_core::{ChangeKind, CheckoutOptions, SyncEngine};
use bulk_http::Method;
use bulk_test_utils::{FakeRemote, TestCheckout};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init(checkout: &TestCheckout, remote: &FakeRemote) {
    let (_, report) = SyncEngine::init(
        Box::new(checkout.store()),
        Box::new(remote.clone()),
        CheckoutOptions {
            url: remote.listing_url(),
            ..CheckoutOptions::default()
        },
    )
    .unwrap();
    assert!(report.is_success(), "{:?}", report.errors);
}

fn open(checkout: &TestCheckout, remote: &FakeRemote) -> SyncEngine {
    SyncEngine::open(Box::new(checkout.store()), Box::new(remote.clone())).unwrap()
}

fn team_remote() -> FakeRemote {
    let remote = FakeRemote::new();
    remote.set_resource("ada", json!({"name": "Ada", "role": "admin"}));
    remote.set_resource("bob", json!({"name": "Bob", "role": "dev"}));
    remote
}

#[test]
fn init_materializes_canonical_files() {
    let checkout = TestCheckout::new();
    let remote = team_remote();

    init(&checkout, &remote);

    assert_eq!(
        checkout.read("ada.json"),
        "{\n  \"name\": \"Ada\",\n  \"role\": \"admin\"\n}\n"
    );
    checkout.assert_file_exists("bob.json");
    checkout.assert_file_exists(".restbulk/cache/bob.json");
    checkout.assert_file_contains(".restbulk/meta.json", "\"versionLocal\": \"v1\"");
}

#[test]
fn edit_push_then_pull_round_trip() {
    let checkout = TestCheckout::new();
    let remote = team_remote();
    remote.stamp_on_write("revision", json!(2));
    init(&checkout, &remote);

    checkout.write("ada.json", r#"{"name": "Ada", "role": "owner"}"#);
    checkout.write("cy.json", r#"{"name": "Cy", "role": "dev"}"#);
    checkout.remove("bob.json");

    let report = open(&checkout, &remote).push().unwrap();
    assert!(report.is_success(), "{:?}", report.errors);
    assert_eq!(report.actions.len(), 3);

    assert_eq!(
        remote.resource("ada"),
        Some(json!({"name": "Ada", "role": "owner", "revision": 2}))
    );
    assert_eq!(
        remote.resource("cy"),
        Some(json!({"name": "Cy", "role": "dev", "revision": 2}))
    );
    assert_eq!(remote.resource("bob"), None);
    assert_eq!(checkout.json("cy.json")["revision"], json!(2));

    let mut engine = open(&checkout, &remote);
    assert!(engine.status().unwrap().is_clean());
    assert!(engine.pull().unwrap().up_to_date);
}

#[test]
fn remote_edit_is_pulled_after_status() {
    let checkout = TestCheckout::new();
    let remote = team_remote();
    init(&checkout, &remote);
    remote.set_resource("bob", json!({"name": "Bob", "role": "lead"}));

    let status = open(&checkout, &remote).status().unwrap();
    assert_eq!(status.remote.len(), 1);
    assert_eq!(status.remote[0].kind, ChangeKind::Modified);

    let report = open(&checkout, &remote).pull().unwrap();

    assert_eq!(report.actions, vec!["pulled bob.json".to_string()]);
    assert_eq!(checkout.json("bob.json")["role"], json!("lead"));
}

#[test]
fn conflict_resolved_by_reset_then_pull() {
    let checkout = TestCheckout::new();
    let remote = team_remote();
    init(&checkout, &remote);
    checkout.write("ada.json", r#"{"name": "Ada", "role": "mine"}"#);
    remote.set_resource("ada", json!({"name": "Ada", "role": "theirs"}));

    let mut engine = open(&checkout, &remote);
    let report = engine.pull().unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(checkout.json("ada.json")["role"], json!("mine"));

    // The cached snapshot already holds the remote version.
    let reset = engine.reset(&["ada.json".to_string()]).unwrap();
    assert_eq!(reset, vec!["ada.json".to_string()]);
    assert_eq!(checkout.json("ada.json")["role"], json!("theirs"));
    assert!(open(&checkout, &remote).status().unwrap().is_clean());
}

#[test]
fn stale_push_is_rejected_by_precondition() {
    let checkout = TestCheckout::new();
    let remote = team_remote();
    init(&checkout, &remote);
    checkout.write("ada.json", r#"{"name": "Ada", "role": "mine"}"#);
    remote.set_resource("ada", json!({"name": "Ada", "role": "theirs"}));

    let report = open(&checkout, &remote).push().unwrap();

    assert_eq!(report.errors.len(), 1);
    let put = &remote.requests_with(Method::Put)[0];
    assert_eq!(put.header("If-Match"), Some("\"v1\""));
    assert_eq!(remote.resource("ada").unwrap()["role"], json!("theirs"));
    assert_eq!(checkout.json("ada.json")["role"], json!("mine"));
}

#[test]
fn nested_ids_map_to_subdirectories() {
    let checkout = TestCheckout::new();
    let remote = FakeRemote::at("https://api.example.com/orgs");
    remote.set_resource("acme/users/1", json!({"id": 1}));
    remote.set_resource("acme/users/2", json!({"id": 2}));
    remote.set_resource("globex/users/1", json!({"id": 1}));

    init(&checkout, &remote);

    checkout.assert_file_exists("acme/users/1.json");
    checkout.assert_file_exists("globex/users/1.json");
    let engine = open(&checkout, &remote);
    assert_eq!(engine.meta().base, "https://api.example.com/orgs/");
    assert_eq!(
        engine.collect_files(false).unwrap(),
        vec![
            "acme/users/1.json".to_string(),
            "acme/users/2.json".to_string(),
            "globex/users/1.json".to_string(),
        ]
    );
}
