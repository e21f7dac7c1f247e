//! End-to-end control scenarios: AppService → ControlCycle → transport.

use std::sync::Arc;

use smartbin::actuators::ActuatorKind;
use smartbin::app::commands::AppCommand;
use smartbin::app::events::{AppEvent, Origin};
use smartbin::app::ports::{ActuatorCommand, TransportOutcome};
use smartbin::app::service::{AppReply, AppService};
use smartbin::config::SystemConfig;
use smartbin::control::{Bound, KeyOutcome};
use smartbin::sensors::SensorKind;

use crate::mock_ports::{MockStore, MockTransport, RecordingSink, TransportProbe, mock_transport};

type App = AppService<MockStore, MockTransport, RecordingSink>;

fn make_app() -> (App, Arc<MockStore>, TransportProbe, Arc<RecordingSink>) {
    let store = Arc::new(MockStore::new());
    let sink = Arc::new(RecordingSink::new());
    let (transport, probe) = mock_transport();
    let app = AppService::new(
        SystemConfig::default(),
        Arc::clone(&store),
        transport,
        Arc::clone(&sink),
    );
    app.register_device().unwrap();
    (app, store, probe, sink)
}

fn activate(kind: ActuatorKind, value: i64) -> ActuatorCommand {
    ActuatorCommand {
        kind,
        action: true,
        threshold: Some(value),
    }
}

fn deactivate(kind: ActuatorKind) -> ActuatorCommand {
    ActuatorCommand {
        kind,
        action: false,
        threshold: None,
    }
}

#[test]
fn fill_level_crossing_is_edge_triggered() {
    let (app, store, probe, _) = make_app();
    let cycle = app.cycle();

    for value in [50, 85, 90, 75] {
        store.set(SensorKind::FillLevel, value);
        cycle.run();
    }

    assert_eq!(
        probe.sent(),
        vec![activate(ActuatorKind::Full, 85), deactivate(ActuatorKind::Full)]
    );
    assert!(!app.actuators().current(ActuatorKind::Full));
}

#[test]
fn failed_activation_is_retried_next_cycle() {
    let (app, store, probe, sink) = make_app();
    let cycle = app.cycle();
    probe.script(&[TransportOutcome::Unreachable, TransportOutcome::ServerError]);
    store.set(SensorKind::Temperature, 70);

    let r1 = cycle.run();
    let r2 = cycle.run();
    let r3 = cycle.run();
    let r4 = cycle.run();

    assert_eq!(r1.outcome(SensorKind::Temperature), Some(KeyOutcome::Failed));
    assert_eq!(r2.outcome(SensorKind::Temperature), Some(KeyOutcome::Failed));
    assert_eq!(
        r3.outcome(SensorKind::Temperature),
        Some(KeyOutcome::Committed { active: true })
    );
    assert_eq!(r4.outcome(SensorKind::Temperature), Some(KeyOutcome::Unchanged));
    assert_eq!(probe.count(), 3);
    assert!(app.actuators().current(ActuatorKind::Fire));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ActuationFailed { .. })),
        2
    );
}

#[test]
fn rejected_request_waits_for_a_threshold_change() {
    let (app, store, probe, _) = make_app();
    let cycle = app.cycle();
    probe.script(&[TransportOutcome::ClientError]);
    store.set(SensorKind::Humidity, 95);

    assert_eq!(
        cycle.run().outcome(SensorKind::Humidity),
        Some(KeyOutcome::Rejected)
    );
    assert_eq!(
        cycle.run().outcome(SensorKind::Humidity),
        Some(KeyOutcome::Suppressed)
    );
    assert_eq!(probe.count(), 1);

    let reply = app.handle_command(AppCommand::SetThreshold {
        sensor: SensorKind::Humidity,
        bound: Bound::Max,
        value: 92,
    });
    assert!(matches!(reply, AppReply::ThresholdUpdated { .. }));

    assert_eq!(
        cycle.run().outcome(SensorKind::Humidity),
        Some(KeyOutcome::Committed { active: true })
    );
    assert_eq!(probe.count(), 2);
}

#[test]
fn outage_on_one_key_does_not_stop_the_others() {
    let (app, store, probe, sink) = make_app();
    store.set(SensorKind::FillLevel, 99);
    store.set(SensorKind::Humidity, 99);
    store.set_down(SensorKind::Temperature, true);

    let report = app.cycle().run();

    assert_eq!(
        report.outcome(SensorKind::Temperature),
        Some(KeyOutcome::StoreUnavailable)
    );
    assert_eq!(report.commands_sent(), 2);
    assert_eq!(probe.count(), 2);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::KeySkipped { sensor: SensorKind::Temperature })),
        1
    );
}

#[test]
fn no_data_never_reaches_transport() {
    let (app, _, probe, _) = make_app();
    let report = app.cycle().run();
    assert_eq!(report.commands_sent(), 0);
    assert_eq!(probe.count(), 0);
}

#[test]
fn manual_trigger_commits_regardless_of_value() {
    let (app, store, probe, sink) = make_app();
    store.set(SensorKind::FillLevel, 10);

    let reply = app.handle_command(AppCommand::Trigger {
        actuator: ActuatorKind::Full,
        active: true,
    });

    assert_eq!(
        reply,
        AppReply::Triggered {
            actuator: ActuatorKind::Full,
            active: true
        }
    );
    assert!(app.actuators().current(ActuatorKind::Full));
    assert_eq!(
        probe.sent(),
        vec![ActuatorCommand {
            kind: ActuatorKind::Full,
            action: true,
            threshold: None,
        }]
    );
    assert_eq!(store.row(ActuatorKind::Full).map(|r| r.active), Some(true));
    assert!(sink.events().contains(&AppEvent::ActuatorCommitted {
        kind: ActuatorKind::Full,
        active: true,
        origin: Origin::Manual,
    }));

    // Back under control of the cycle: inside the band, so it switches off.
    assert_eq!(
        app.cycle().run().outcome(SensorKind::FillLevel),
        Some(KeyOutcome::Committed { active: false })
    );
}

#[test]
fn registration_resets_committed_state() {
    let (app, store, _, _) = make_app();
    store.set(SensorKind::Temperature, 80);
    app.cycle().run();
    assert!(app.actuators().current(ActuatorKind::Fire));

    app.register_device().unwrap();

    assert!(!app.actuators().current(ActuatorKind::Fire));
    assert_eq!(store.row(ActuatorKind::Fire).map(|r| r.active), Some(false));
}

#[test]
fn concurrent_threshold_writes_keep_the_band_valid() {
    let (app, _, _, _) = make_app();
    let app = Arc::new(app);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let app = Arc::clone(&app);
            std::thread::spawn(move || {
                for v in 0..200 {
                    let (bound, value) = if i % 2 == 0 {
                        (Bound::Min, v - 100)
                    } else {
                        (Bound::Max, v - 100)
                    };
                    app.handle_command(AppCommand::SetThreshold {
                        sensor: SensorKind::Temperature,
                        bound,
                        value,
                    });
                    let t = app.thresholds().get(SensorKind::Temperature);
                    assert!(t.min.unwrap() < t.max.unwrap(), "band inverted: {t:?}");
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
