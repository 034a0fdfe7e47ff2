//! Integration tests for [`Deployment`] against the in-memory monitor.

use cirrus_config::DeploymentSettings;
use cirrus_runtime::deployment::Deployment;
use cirrus_runtime::error::{MonitorError, OutputError};
use cirrus_runtime::monitor::RegisterResourceResponse;
use cirrus_runtime::options::ResourceOptions;
use cirrus_runtime::output::Output;
use cirrus_runtime::property::{PropertyMap, PropertyValue};
use cirrus_runtime::testing::RecordingMonitor;
use cirrus_runtime::urn::Urn;
use std::sync::Arc;
use std::time::Duration;

const CUSTOM_TYPE: &str = "test::Bucket";
const COMPONENT_TYPE: &str = "test::Site";

fn setup() -> (Arc<RecordingMonitor>, Deployment) {
    let monitor = Arc::new(RecordingMonitor::new("proj", "dev"));
    let deployment = monitor.deployment();
    (monitor, deployment)
}

fn props(entries: &[(&str, &str)]) -> PropertyMap {
    let mut map = PropertyMap::new();
    for (name, value) in entries {
        map.insert(*name, *value);
    }
    map
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn custom_registration_echoes_inputs_and_assigns_id() {
    let (monitor, deployment) = setup();
    let registered = deployment.register_resource(
        CUSTOM_TYPE,
        "bucket",
        props(&[("region", "eu")]),
        ResourceOptions::new(),
        true,
        false,
    );

    let urn = registered.urn().value().await.unwrap();
    assert_eq!(urn.as_str(), "urn:cirrus:dev::proj::test::Bucket::bucket");
    assert!(registered.id().value().await.unwrap().is_some());

    let region: Output<String> = registered.output("region");
    assert_eq!(region.value().await.unwrap(), "eu");

    let reference = registered.reference().value().await.unwrap();
    assert_eq!(reference.urn, urn);

    assert_eq!(monitor.registrations().len(), 1);
}

#[tokio::test]
async fn component_registration_has_no_id() {
    let (monitor, deployment) = setup();
    let registered = deployment.register_resource(
        COMPONENT_TYPE,
        "site",
        PropertyMap::new(),
        ResourceOptions::new().with_version("1.2.3"),
        false,
        true,
    );

    assert_eq!(registered.id().value().await.unwrap(), None);

    let request = monitor.registration("site").unwrap();
    assert!(!request.custom);
    assert!(request.remote);
    assert_eq!(request.options.version.as_deref(), Some("1.2.3"));
}

#[tokio::test]
async fn missing_output_decodes_as_null() {
    let (_monitor, deployment) = setup();
    let registered = deployment.register_resource(
        CUSTOM_TYPE,
        "bucket",
        PropertyMap::new(),
        ResourceOptions::new(),
        true,
        false,
    );

    let absent: Output<Option<String>> = registered.output("missing");
    assert_eq!(absent.value().await.unwrap(), None);

    let required: Output<String> = registered.output("missing");
    assert!(matches!(
        required.value().await.unwrap_err(),
        OutputError::Decode(_)
    ));
}

#[tokio::test]
async fn extra_outputs_are_merged() {
    let (monitor, deployment) = setup();
    monitor.add_outputs(CUSTOM_TYPE, props(&[("arn", "arn:bucket")]));

    let registered = deployment.register_resource(
        CUSTOM_TYPE,
        "bucket",
        props(&[("region", "eu")]),
        ResourceOptions::new(),
        true,
        false,
    );

    let outputs = registered.outputs().value().await.unwrap();
    assert_eq!(outputs.get("arn").and_then(PropertyValue::as_str), Some("arn:bucket"));
    assert_eq!(outputs.get("region").and_then(PropertyValue::as_str), Some("eu"));
}

#[tokio::test]
async fn parent_type_is_qualified_into_urn() {
    let (_monitor, deployment) = setup();
    let parent = deployment.register_resource(
        COMPONENT_TYPE,
        "site",
        PropertyMap::new(),
        ResourceOptions::new(),
        false,
        true,
    );
    let parent_ref = parent.reference().value().await.unwrap();

    let child = deployment.register_resource(
        CUSTOM_TYPE,
        "assets",
        PropertyMap::new(),
        ResourceOptions::new().with_parent(parent_ref),
        true,
        false,
    );

    let urn = child.urn().value().await.unwrap();
    assert_eq!(urn.qualified_type(), "test::Site$test::Bucket");
    assert_eq!(urn.type_token(), CUSTOM_TYPE);
    assert_eq!(urn.name(), "assets");
}

#[tokio::test]
async fn rejected_registration_fails_outputs() {
    let (monitor, deployment) = setup();
    monitor.fail_type(CUSTOM_TYPE, MonitorError::Rejected("denied".into()));

    let registered = deployment.register_resource(
        CUSTOM_TYPE,
        "bucket",
        PropertyMap::new(),
        ResourceOptions::new(),
        true,
        false,
    );

    let expected = OutputError::failed("monitor rejected request: denied");
    assert_eq!(registered.urn().value().await.unwrap_err(), expected);
    assert_eq!(registered.id().value().await.unwrap_err(), expected);
}

// ─────────────────────────────────────────────────────────────────────────────
// Reads and lookups
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn read_resource_uses_given_id() {
    let (monitor, deployment) = setup();
    let registered = deployment.read_resource(
        CUSTOM_TYPE,
        "bucket",
        "bkt-1".into(),
        Some(props(&[("region", "us")])),
        ResourceOptions::new(),
    );

    assert_eq!(registered.id().value().await.unwrap().as_deref(), Some("bkt-1"));
    let reads = monitor.reads();
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].properties.get("region").and_then(PropertyValue::as_str), Some("us"));
}

#[tokio::test]
async fn read_resource_waits_for_pending_id() {
    let (_monitor, deployment) = setup();
    let (id, resolver) = Output::pending();
    let registered = deployment.read_resource(
        CUSTOM_TYPE,
        "bucket",
        id.into(),
        None,
        ResourceOptions::new(),
    );

    resolver.resolve("late".to_string());
    assert_eq!(registered.id().value().await.unwrap().as_deref(), Some("late"));
}

#[tokio::test]
async fn options_urn_looks_up_instead_of_registering() {
    let (monitor, deployment) = setup();
    let urn = Urn::parse("urn:cirrus:dev::proj::test::Bucket::existing").unwrap();
    monitor.insert_existing(RegisterResourceResponse {
        urn: urn.clone(),
        id: Some("bkt-9".into()),
        outputs: props(&[("region", "ap")]),
    });

    let registered = deployment.register_resource(
        CUSTOM_TYPE,
        "ignored",
        PropertyMap::new(),
        ResourceOptions::new().with_urn(urn.clone()),
        true,
        false,
    );

    assert_eq!(registered.urn().value().await.unwrap(), urn);
    assert_eq!(registered.id().value().await.unwrap().as_deref(), Some("bkt-9"));
    assert!(monitor.registrations().is_empty());
}

#[tokio::test]
async fn lookup_of_unknown_urn_fails() {
    let (_monitor, deployment) = setup();
    let urn = Urn::parse("urn:cirrus:dev::proj::test::Bucket::nowhere").unwrap();

    let registered = deployment.get_resource(urn.clone(), true);
    assert_eq!(
        registered.urn().value().await.unwrap_err(),
        OutputError::failed(format!("resource not found: {urn}"))
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Dry runs and parallelism
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dry_run_custom_resource_without_id_has_unknown_id() {
    let monitor = Arc::new(RecordingMonitor::new("proj", "dev"));
    let deployment =
        monitor.deployment_with(DeploymentSettings::new("proj", "dev").with_dry_run(true));
    let urn = Urn::parse("urn:cirrus:dev::proj::test::Bucket::planned").unwrap();
    monitor.insert_existing(RegisterResourceResponse {
        urn: urn.clone(),
        id: None,
        outputs: PropertyMap::new(),
    });

    let registered = deployment.get_resource(urn, true);
    assert_eq!(registered.id().value().await.unwrap_err(), OutputError::Unknown);
    assert!(registered.urn().value().await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dependent_registrations_complete_with_one_permit() {
    let monitor = Arc::new(RecordingMonitor::new("proj", "dev"));
    let deployment =
        monitor.deployment_with(DeploymentSettings::new("proj", "dev").with_parallel(1));

    let first = deployment.register_resource(
        CUSTOM_TYPE,
        "first",
        props(&[("region", "eu")]),
        ResourceOptions::new(),
        true,
        false,
    );
    let mut chained = PropertyMap::new();
    chained.insert("source", first.outputs().clone());
    let second = deployment.register_resource(
        CUSTOM_TYPE,
        "second",
        chained,
        ResourceOptions::new(),
        true,
        false,
    );

    tokio::time::timeout(Duration::from_secs(5), deployment.wait_for_registrations())
        .await
        .expect("registrations deadlocked");
    assert!(second.urn().value().await.is_ok());
    assert_eq!(monitor.registrations().len(), 2);
}
