//! Broker payloads → IngestQueue → IngestWorker → store → control cycle.

use std::sync::Arc;

use smartbin::actuators::ActuatorKind;
use smartbin::adapters::memory_store::MemoryStore;
use smartbin::app::service::AppService;
use smartbin::config::SystemConfig;
use smartbin::control::KeyOutcome;
use smartbin::error::IngestError;
use smartbin::sensors::SensorKind;
use smartbin::sensors::ingest::{
    Delivery, INGEST_QUEUE_DEPTH, IngestQueue, IngestWorker, decode_payload,
};

use crate::mock_ports::{RecordingSink, mock_transport};

fn deliver(queue: &IngestQueue, topic: &str, body: &str, now: u64) {
    let routes = SystemConfig::default().device.topic_routes();
    match decode_payload(topic, body.as_bytes(), &routes, now).unwrap() {
        Delivery::Reading(r) => queue.try_push(r).unwrap(),
        Delivery::ButtonPress => panic!("unexpected button press"),
    }
}

#[test]
fn delivered_readings_drive_the_next_cycle() {
    let store = Arc::new(MemoryStore::new());
    let (transport, probe) = mock_transport();
    let app = AppService::new(
        SystemConfig::default(),
        Arc::clone(&store),
        transport,
        Arc::new(RecordingSink::new()),
    );
    app.register_device().unwrap();

    let queue = Arc::new(IngestQueue::new());
    let worker = IngestWorker::spawn(Arc::clone(&queue), Arc::clone(&store)).unwrap();

    deliver(&queue, "distance", r#"{"value": 91, "sensor_ip": "fd00::203"}"#, 10);
    deliver(&queue, "temperature", r#"{"value": 22.7}"#, 10);
    queue.close();
    let stats = worker.join().unwrap();
    assert_eq!(stats.stored, 2);

    let fill = store.latest_reading(SensorKind::FillLevel).unwrap();
    assert_eq!(fill.source_address.as_deref(), Some("fd00::203"));
    assert_eq!(
        store.latest_reading(SensorKind::Temperature).map(|r| r.value),
        Some(22)
    );

    let report = app.cycle().run();
    assert_eq!(
        report.outcome(SensorKind::FillLevel),
        Some(KeyOutcome::Committed { active: true })
    );
    assert_eq!(report.outcome(SensorKind::Temperature), Some(KeyOutcome::Unchanged));
    assert_eq!(report.outcome(SensorKind::Humidity), Some(KeyOutcome::NoData));
    assert_eq!(probe.count(), 1);
    assert!(app.actuators().current(ActuatorKind::Full));
}

#[test]
fn full_queue_drops_instead_of_blocking() {
    let queue = IngestQueue::new();
    for i in 0..INGEST_QUEUE_DEPTH {
        deliver(&queue, "humidity", r#"{"value": 40}"#, i as u64);
    }
    let routes = SystemConfig::default().device.topic_routes();
    let Ok(Delivery::Reading(extra)) =
        decode_payload("humidity", br#"{"value": 41}"#, &routes, 99)
    else {
        panic!("decode failed");
    };
    assert_eq!(queue.try_push(extra), Err(IngestError::QueueFull));
    assert_eq!(queue.len(), INGEST_QUEUE_DEPTH);
}

#[test]
fn unknown_topics_and_bad_bodies_are_refused() {
    let routes = SystemConfig::default().device.topic_routes();
    assert_eq!(
        decode_payload("pressure", br#"{"value": 1}"#, &routes, 0),
        Err(IngestError::UnknownTopic)
    );
    assert_eq!(
        decode_payload("distance", b"not json", &routes, 0),
        Err(IngestError::MalformedPayload)
    );
    assert_eq!(
        decode_payload("button", br#"{"button": "pressed"}"#, &routes, 0),
        Ok(Delivery::ButtonPress)
    );
}
