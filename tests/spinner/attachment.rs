use serde_json::json;
use spindle::spinner::{AttachRequest, BindingChange, SpinnerAttachment, SpinnerConfig};

use super::{bootstrap_config, options, recording_registry};

fn keyed(key: &str) -> AttachRequest {
    AttachRequest {
        key: Some(key.to_string()),
        ..AttachRequest::default()
    }
}

#[test]
fn given_unkeyed_attach_when_attached_then_spins_automatically() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());

    let attachment = SpinnerAttachment::attach(&registry, AttachRequest::default())
        .expect("attach should succeed");

    assert!(attachment.handle().is_spinning());
    assert_eq!(recorder.create_count(), 1);
    assert_eq!(recorder.spin_count(), 1);
    assert_eq!(recorder.stop_count(), 0);
}

#[test]
fn given_keyed_attach_without_start_active_when_attached_then_stays_idle() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());

    let attachment =
        SpinnerAttachment::attach(&registry, keyed("spinner")).expect("attach should succeed");

    assert!(!attachment.handle().is_spinning());
    assert_eq!(recorder.spin_count(), 0);
}

#[test]
fn given_keyed_attach_with_start_active_when_attached_then_spins() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());

    let attachment = SpinnerAttachment::attach(
        &registry,
        AttachRequest {
            start_active: true,
            ..keyed("spinner")
        },
    )
    .expect("attach should succeed");

    assert!(attachment.handle().is_spinning());
    assert_eq!(recorder.spin_count(), 1);
}

#[test]
fn given_start_active_binding_when_it_becomes_truthy_then_starts_exactly_once() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let mut attachment =
        SpinnerAttachment::attach(&registry, keyed("spinner")).expect("attach should succeed");

    attachment
        .apply(BindingChange::StartActive(true))
        .expect("binding should apply");
    attachment
        .apply(BindingChange::StartActive(true))
        .expect("binding should apply");

    assert!(attachment.handle().is_spinning());
    assert_eq!(recorder.spin_count(), 1);

    attachment
        .apply(BindingChange::StartActive(false))
        .expect("binding should apply");
    assert!(attachment.handle().is_spinning());
}

#[test]
fn given_spin_on_binding_when_toggled_then_drives_start_and_stop() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let mut attachment = SpinnerAttachment::attach(
        &registry,
        AttachRequest {
            spin_on: Some(false),
            ..AttachRequest::default()
        },
    )
    .expect("attach should succeed");

    assert_eq!(recorder.create_count(), 1);
    assert_eq!(recorder.spin_count(), 0);

    attachment
        .apply(BindingChange::SpinOn(true))
        .expect("binding should apply");
    assert_eq!(recorder.spin_count(), 1);

    attachment
        .apply(BindingChange::SpinOn(false))
        .expect("binding should apply");
    assert_eq!(recorder.stop_count(), 1);
    assert!(!attachment.handle().is_spinning());
}

#[test]
fn given_bound_options_when_changed_then_spinner_restarts_with_new_options() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let mut attachment = SpinnerAttachment::attach(
        &registry,
        AttachRequest {
            instance_options: options(json!({"width": 25})),
            ..AttachRequest::default()
        },
    )
    .expect("attach should succeed");

    assert_eq!(recorder.last_created(), Some(options(json!({"width": 25}))));
    assert_eq!(recorder.stop_count(), 0);

    attachment
        .apply(BindingChange::InstanceOptions(options(json!({"width": 72}))))
        .expect("binding should apply");

    assert_eq!(recorder.last_created(), Some(options(json!({"width": 72}))));
    assert_eq!(recorder.stop_count(), 1);
    assert_eq!(recorder.spin_count(), 2);
}

#[test]
fn given_theme_binding_when_changed_then_theme_layer_is_swapped() {
    let (registry, recorder) = recording_registry(bootstrap_config());
    let mut attachment = SpinnerAttachment::attach(
        &registry,
        AttachRequest {
            instance_options: options(json!({"width": 15})),
            ..AttachRequest::default()
        },
    )
    .expect("attach should succeed");

    attachment
        .apply(BindingChange::Theme(Some("bigRed".to_string())))
        .expect("binding should apply");

    assert_eq!(
        recorder.last_created(),
        Some(options(json!({"width": 15, "color": "red", "speed": 20})))
    );
    assert_eq!(attachment.handle().theme_name().as_deref(), Some("bigRed"));
    assert!(attachment.handle().is_spinning());
}

#[test]
fn given_key_binding_when_changed_then_broadcasts_follow_new_key() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let mut attachment =
        SpinnerAttachment::attach(&registry, keyed("old")).expect("attach should succeed");

    attachment
        .apply(BindingChange::Key(Some("new".to_string())))
        .expect("binding should apply");

    registry.spin(Some("old"));
    assert_eq!(recorder.spin_count(), 0);
    registry.spin(Some("new"));
    assert_eq!(recorder.spin_count(), 1);
}

#[test]
fn given_spinning_attachment_when_detached_then_stopped_and_unregistered() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    let attachment = SpinnerAttachment::attach(&registry, AttachRequest::default())
        .expect("attach should succeed");
    let handle = std::rc::Rc::clone(attachment.handle());
    assert_eq!(recorder.stop_count(), 0);

    attachment.detach();

    assert_eq!(recorder.stop_count(), 1);
    assert!(handle.is_destroyed());
    assert!(registry.is_empty());
    registry.spin(None);
    assert_eq!(recorder.spin_count(), 1);
}

#[test]
fn given_attachment_when_dropped_then_handle_is_destroyed() {
    let (registry, recorder) = recording_registry(SpinnerConfig::default());
    {
        let _attachment = SpinnerAttachment::attach(&registry, AttachRequest::default())
            .expect("attach should succeed");
    }

    assert_eq!(recorder.stop_count(), 1);
    assert!(registry.is_empty());
}
