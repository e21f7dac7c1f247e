//! Console → AppService round trips, as an operator would type them.

use std::sync::Arc;

use smartbin::actuators::ActuatorKind;
use smartbin::adapters::memory_store::MemoryStore;
use smartbin::app::ports::PersistencePort;
use smartbin::app::service::AppService;
use smartbin::config::SystemConfig;
use smartbin::console::{Console, ConsoleOutput};
use smartbin::sensors::{SensorKind, SensorReading};

use crate::mock_ports::{MockTransport, RecordingSink, TransportProbe, mock_transport};

type App = AppService<MemoryStore, MockTransport, RecordingSink>;

fn make_app() -> (App, Arc<MemoryStore>, TransportProbe) {
    let store = Arc::new(MemoryStore::new());
    let (transport, probe) = mock_transport();
    let app = AppService::new(
        SystemConfig::default(),
        Arc::clone(&store),
        transport,
        Arc::new(RecordingSink::new()),
    );
    app.register_device().unwrap();
    (app, store, probe)
}

fn type_line(console: &mut Console, app: &App, line: &str) -> String {
    match console.feed(line, |cmd| app.handle_command(cmd)) {
        ConsoleOutput::Reply(text) => text,
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn guided_threshold_change_updates_the_registry() {
    let (app, _, _) = make_app();
    let mut console = Console::new();

    type_line(&mut console, &app, "SET THRESHOLD");
    type_line(&mut console, &app, "temperature");
    type_line(&mut console, &app, "min");
    let out = type_line(&mut console, &app, "5");

    assert!(out.starts_with("Threshold updated successfully"), "{out}");
    assert_eq!(app.thresholds().get(SensorKind::Temperature).min, Some(5));
}

#[test]
fn inverted_band_is_refused_and_registry_unchanged() {
    let (app, _, _) = make_app();
    let mut console = Console::new();

    for line in ["set threshold", "temperature", "MIN"] {
        type_line(&mut console, &app, line);
    }
    let out = type_line(&mut console, &app, "60");

    assert!(out.starts_with("Threshold update failed"), "{out}");
    let t = app.thresholds().get(SensorKind::Temperature);
    assert_eq!((t.min, t.max), (Some(-10), Some(50)));
    assert_eq!(app.thresholds().revision(SensorKind::Temperature), 0);
}

#[test]
fn fill_level_has_no_minimum() {
    let (app, _, _) = make_app();
    let mut console = Console::new();
    for line in ["set threshold", "fill_level", "MIN"] {
        type_line(&mut console, &app, line);
    }
    assert!(type_line(&mut console, &app, "10").starts_with("Threshold update failed"));

    for line in ["set threshold", "fill_level", "MAX"] {
        type_line(&mut console, &app, line);
    }
    assert!(type_line(&mut console, &app, "70").starts_with("Threshold updated"));
    assert_eq!(app.thresholds().get(SensorKind::FillLevel).max, Some(70));
}

#[test]
fn trigger_and_status_reflect_committed_state() {
    let (app, store, probe) = make_app();
    let mut console = Console::new();
    store
        .record_reading(&SensorReading::new(SensorKind::Temperature, 21, 1))
        .unwrap();

    assert_eq!(type_line(&mut console, &app, "trigger fire"), "fire activated");
    assert_eq!(probe.count(), 1);
    assert!(app.actuators().current(ActuatorKind::Fire));

    let status = type_line(&mut console, &app, "get status");
    assert!(status.contains("temperature"), "{status}");
    assert!(status.contains("value=21"), "{status}");
    assert!(status.contains("fire=ON"), "{status}");
    assert!(status.contains("n/a"), "{status}");

    assert_eq!(type_line(&mut console, &app, "untrigger fire"), "fire deactivated");
    assert!(!app.actuators().current(ActuatorKind::Fire));
}

#[test]
fn configuration_shows_current_bands() {
    let (app, _, _) = make_app();
    let mut console = Console::new();
    for line in ["set threshold", "humidity", "MAX", "85"] {
        type_line(&mut console, &app, line);
    }
    let out = type_line(&mut console, &app, "get configuration");
    assert!(out.contains("control period 10000 ms"), "{out}");
    assert!(out.contains("MAX=85"), "{out}");
}

#[test]
fn quit_ends_the_session() {
    let (app, _, _) = make_app();
    let mut console = Console::new();
    assert_eq!(
        console.feed("quit", |cmd| app.handle_command(cmd)),
        ConsoleOutput::Quit
    );
}
