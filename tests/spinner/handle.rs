use serde_json::json;
use spindle::spinner::{
    HandleSpec, SpinState, SpinnerConfig, SpinnerErrorKind, SpinnerHandle,
    testing::PrimitiveCall,
};

use super::{options, recording_registry};

#[test]
fn given_new_handle_when_created_then_idle_with_one_primitive() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());

    let handle = SpinnerHandle::create(&registry, HandleSpec::default())
        .expect("handle should be created");

    assert_eq!(handle.state(), SpinState::Idle);
    assert_eq!(recorder.create_count(), 1);
    assert_eq!(recorder.spin_count(), 0);
    assert!(registry.contains(handle.id()));
}

#[test]
fn given_spinning_handle_when_started_again_then_primitive_spins_once() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let handle = SpinnerHandle::create(&registry, HandleSpec::default())
        .expect("handle should be created");

    assert!(handle.start());
    assert!(!handle.start());

    assert_eq!(recorder.spin_count(), 1);
    assert!(handle.is_spinning());
}

#[test]
fn given_idle_handle_when_stopped_then_primitive_is_untouched() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let handle = SpinnerHandle::create(&registry, HandleSpec::default())
        .expect("handle should be created");

    assert!(!handle.stop());
    assert_eq!(recorder.stop_count(), 0);
}

#[test]
fn given_spinning_handle_when_reconfigured_then_new_primitive_spins_once() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let handle = SpinnerHandle::create(
        &registry,
        HandleSpec {
            instance_options: options(json!({"radius": 5})),
            ..HandleSpec::default()
        },
    )
    .expect("handle should be created");
    handle.start();

    let rebuilt = handle
        .reconfigure(options(json!({"radius": 9})), None)
        .expect("reconfigure should succeed");

    assert!(rebuilt);
    let log = recorder.log();
    assert_eq!(log.create_count(), 2);
    assert_eq!(log.stops_of(0), 1);
    assert_eq!(log.spins_of(1), 1);
    assert_eq!(
        log.calls,
        vec![
            PrimitiveCall::Spin(0),
            PrimitiveCall::Stop(0),
            PrimitiveCall::Spin(1)
        ]
    );
    assert_eq!(handle.merged_options(), options(json!({"radius": 9})));
    assert!(handle.is_spinning());
}

#[test]
fn given_idle_handle_when_reconfigured_then_new_primitive_is_not_started() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let handle = SpinnerHandle::create(&registry, HandleSpec::default())
        .expect("handle should be created");

    handle
        .reconfigure(options(json!({"radius": 9})), None)
        .expect("reconfigure should succeed");

    assert_eq!(recorder.create_count(), 2);
    assert_eq!(recorder.spin_count(), 0);
    assert_eq!(recorder.stop_count(), 0);
    assert_eq!(handle.state(), SpinState::Idle);
}

#[test]
fn given_equivalent_options_when_reconfigured_then_primitive_is_kept() {
    let mut config = SpinnerConfig::new();
    config.set_defaults(options(json!({"color": "black"})));
    let (registry, recorder) = recording_registry(config);
    let handle = SpinnerHandle::create(&registry, HandleSpec::default())
        .expect("handle should be created");

    let rebuilt = handle
        .reconfigure(options(json!({"color": "black"})), None)
        .expect("reconfigure should succeed");

    assert!(!rebuilt);
    assert_eq!(recorder.create_count(), 1);
    assert_eq!(handle.instance_options(), options(json!({"color": "black"})));
}

#[test]
fn given_failing_factory_when_reconfigured_then_error_propagates_and_handle_is_unchanged() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let handle = SpinnerHandle::create(
        &registry,
        HandleSpec {
            instance_options: options(json!({"width": 1})),
            ..HandleSpec::default()
        },
    )
    .expect("handle should be created");
    handle.start();
    recorder.fail_creation(true);

    let err = handle
        .reconfigure(options(json!({"width": 2})), None)
        .expect_err("factory failure should propagate");

    assert_eq!(err.kind, SpinnerErrorKind::PrimitiveCreation);
    assert_eq!(handle.merged_options(), options(json!({"width": 1})));
    assert_eq!(handle.instance_options(), options(json!({"width": 1})));
    assert!(handle.is_spinning());
    assert_eq!(recorder.stop_count(), 0);
}

#[test]
fn given_failing_factory_when_creating_then_nothing_is_registered() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    recorder.fail_creation(true);

    let err = SpinnerHandle::create(&registry, HandleSpec::default())
        .expect_err("creation should fail");

    assert_eq!(err.kind, SpinnerErrorKind::PrimitiveCreation);
    assert!(registry.is_empty());
}

#[test]
fn given_spinning_handle_when_destroyed_then_stopped_once_and_unregistered() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let handle = SpinnerHandle::create(
        &registry,
        HandleSpec {
            key: Some("a".to_string()),
            ..HandleSpec::default()
        },
    )
    .expect("handle should be created");
    handle.start();

    handle.destroy();
    handle.destroy();

    assert_eq!(recorder.stop_count(), 1);
    assert!(!registry.contains(handle.id()));
    assert!(handle.is_destroyed());

    registry.spin(Some("a"));
    registry.spin(None);
    assert!(!handle.start());
    assert_eq!(recorder.spin_count(), 1);
}

#[test]
fn given_destroyed_handle_when_reconfigured_then_noop() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let handle = SpinnerHandle::create(&registry, HandleSpec::default())
        .expect("handle should be created");
    handle.destroy();

    let rebuilt = handle
        .reconfigure(options(json!({"width": 3})), None)
        .expect("reconfigure on destroyed handle is a no-op");

    assert!(!rebuilt);
    assert_eq!(recorder.create_count(), 1);
    assert!(!handle.rekey(Some("b".to_string())));
}
