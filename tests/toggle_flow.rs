mod common;

use device_intervals::event::EventError;
use device_intervals::handler::{handle, HandlerError};
use device_intervals::store::{IntervalRecord, IntervalStore};

use common::{event, open_store};

#[test]
fn no_prior_record_opens_interval() {
    let fixture = open_store(&[]);
    handle(&fixture.store, &event("d1", "100")).expect("handle");

    assert_eq!(
        fixture.store.get_interval("d1", "100").unwrap(),
        Some(IntervalRecord::open("d1", "100"))
    );
}

#[test]
fn open_record_is_closed_in_place() {
    let fixture = open_store(&[IntervalRecord::open("d1", "100")]);
    handle(&fixture.store, &event("d1", "200")).expect("handle");

    assert_eq!(
        fixture.store.list_intervals("d1", 10).unwrap(),
        vec![IntervalRecord::closed("d1", "100", "200")]
    );
}

#[test]
fn closed_record_is_left_alone_and_new_interval_opens() {
    let fixture = open_store(&[IntervalRecord::closed("d1", "100", "150")]);
    handle(&fixture.store, &event("d1", "200")).expect("handle");

    assert_eq!(
        fixture.store.list_intervals("d1", 10).unwrap(),
        vec![
            IntervalRecord::open("d1", "200"),
            IntervalRecord::closed("d1", "100", "150"),
        ]
    );
}

#[test]
fn latest_of_several_closed_records_decides() {
    let fixture = open_store(&[
        IntervalRecord::closed("test-device", "1134567890", "1144567890"),
        IntervalRecord::closed("test-device", "1234567880", "1234567888"),
    ]);
    handle(&fixture.store, &event("test-device", "1234567890")).expect("handle");

    assert_eq!(
        fixture
            .store
            .get_interval("test-device", "1234567890")
            .unwrap(),
        Some(IntervalRecord::open("test-device", "1234567890"))
    );
}

#[test]
fn latest_open_record_is_closed_even_with_older_history() {
    let fixture = open_store(&[
        IntervalRecord::closed("test-device", "1134567890", "1144567890"),
        IntervalRecord::open("test-device", "1234567880"),
    ]);
    handle(&fixture.store, &event("test-device", "1234567890")).expect("handle");

    assert_eq!(
        fixture
            .store
            .get_interval("test-device", "1234567880")
            .unwrap(),
        Some(IntervalRecord::closed(
            "test-device",
            "1234567880",
            "1234567890"
        ))
    );
    assert_eq!(
        fixture.store.list_intervals("test-device", 10).unwrap().len(),
        2
    );
}

#[test]
fn devices_toggle_independently() {
    let fixture = open_store(&[IntervalRecord::open("d1", "100")]);
    handle(&fixture.store, &event("d2", "150")).expect("handle d2");
    handle(&fixture.store, &event("d1", "200")).expect("handle d1");

    assert_eq!(
        fixture.store.latest_interval("d1").unwrap(),
        Some(IntervalRecord::closed("d1", "100", "200"))
    );
    assert_eq!(
        fixture.store.latest_interval("d2").unwrap(),
        Some(IntervalRecord::open("d2", "150"))
    );
}

#[test]
fn missing_device_id_fails_without_side_effects() {
    let fixture = open_store(&[]);
    let err = handle(&fixture.store, &serde_json::json!({"timestamp": "100"})).unwrap_err();

    assert!(matches!(
        err,
        HandlerError::Event(EventError::MissingField("deviceId"))
    ));
    assert!(fixture.store.intervals.is_empty());
}
