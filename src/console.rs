//! Operator console: a line-driven command surface.
//!
//! Transport-decoupled: the console owns no terminal.  Callers feed one
//! input line at a time via [`Console::feed`] together with a closure
//! that executes an [`AppCommand`], and print the returned text.
//!
//! ```text
//!            "set threshold"        sensor key         MIN / MAX
//!   ┌─────┐ ───────────────▶ ┌────────┐ ─────────▶ ┌───────┐ ────────▶ ┌───────┐
//!   │ Top │                  │ Sensor │            │ Bound │           │ Value │
//!   └─────┘ ◀─────────────── └────────┘ ◀───────── └───────┘ ◀──────── └───────┘
//!                        invalid input at any step aborts to Top;
//!                        a valid integer executes and returns to Top
//! ```
//!
//! Input is case-insensitive and whitespace-trimmed.

use crate::actuators::ActuatorKind;
use crate::app::commands::AppCommand;
use crate::app::service::AppReply;
use crate::control::thresholds::Bound;
use crate::sensors::SensorKind;

pub const HELP: &str = "\
Available commands:
  help                          this list
  get status                    latest values, bands and actuator states
  get configuration             thresholds and control timing
  set threshold                 change a MIN or MAX bound (guided)
  trigger <fire|leak|full>      switch an actuator on
  untrigger <fire|leak|full>    switch an actuator off
  publish <topic> <json>        inject a sensor message
  quit                          stop the controller";

/// What the caller should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleOutput {
    /// Print this text (may be empty).
    Reply(String),
    /// Hand a raw sensor message to the ingest path.
    Publish { topic: String, payload: String },
    /// Stop the controller.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Top,
    Sensor,
    Bound(SensorKind),
    Value(SensorKind, Bound),
}

#[derive(Debug)]
pub struct Console {
    step: Step,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        Self { step: Step::Top }
    }

    /// Prompt for the current step.
    pub fn prompt(&self) -> &'static str {
        match self.step {
            Step::Top => "> ",
            Step::Sensor => "sensor (fill_level | temperature | humidity)? ",
            Step::Bound(_) => "MIN or MAX? ",
            Step::Value(..) => "new value? ",
        }
    }

    /// `true` while a multi-step flow is in progress.
    pub fn in_flow(&self) -> bool {
        self.step != Step::Top
    }

    /// Process one input line.
    pub fn feed<F>(&mut self, line: &str, exec: F) -> ConsoleOutput
    where
        F: FnOnce(AppCommand) -> AppReply,
    {
        let line = line.trim();
        match self.step {
            Step::Top => self.top_level(line, exec),
            Step::Sensor => {
                self.step = Step::Top;
                match SensorKind::from_key(line) {
                    Some(sensor) => {
                        self.step = Step::Bound(sensor);
                        say("")
                    }
                    None => say(format!("Unknown sensor '{line}', aborted")),
                }
            }
            Step::Bound(sensor) => {
                self.step = Step::Top;
                match Bound::from_key(line) {
                    Some(bound) => {
                        self.step = Step::Value(sensor, bound);
                        say("")
                    }
                    None => say("Invalid choice. Type MIN or MAX."),
                }
            }
            Step::Value(sensor, bound) => {
                self.step = Step::Top;
                match line.parse::<i64>() {
                    Ok(value) => say(render(&exec(AppCommand::SetThreshold {
                        sensor,
                        bound,
                        value,
                    }))),
                    Err(_) => say("Invalid value"),
                }
            }
        }
    }

    fn top_level<F>(&mut self, line: &str, exec: F) -> ConsoleOutput
    where
        F: FnOnce(AppCommand) -> AppReply,
    {
        if line.is_empty() {
            return say("");
        }
        let lower = line.to_ascii_lowercase();
        let mut words = lower.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let arg = words.next();
        let extra = words.next().is_some();

        match (verb, arg, extra) {
            ("help", None, false) => say(HELP),
            ("quit" | "exit", None, false) => ConsoleOutput::Quit,
            ("get", Some("status"), false) => say(render(&exec(AppCommand::GetStatus))),
            ("get", Some("configuration" | "config"), false) => {
                say(render(&exec(AppCommand::GetConfiguration)))
            }
            ("set", Some("threshold"), false) => {
                self.step = Step::Sensor;
                say("")
            }
            ("trigger" | "untrigger", Some(kind), false) => match ActuatorKind::from_key(kind) {
                Some(actuator) => say(render(&exec(AppCommand::Trigger {
                    actuator,
                    active: verb == "trigger",
                }))),
                None => say(format!("Usage: {verb} <fire|leak|full>")),
            },
            ("trigger" | "untrigger", None, _) => say(format!("Usage: {verb} <fire|leak|full>")),
            ("publish", Some(_), _) => {
                // Topic and payload keep their case.
                let rest = line[verb.len()..].trim_start();
                let (topic, payload) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let payload = payload.trim();
                if payload.is_empty() {
                    return say("Usage: publish <topic> <json>");
                }
                ConsoleOutput::Publish {
                    topic: topic.to_owned(),
                    payload: payload.to_owned(),
                }
            }
            _ => say("Unknown command"),
        }
    }
}

fn say(text: impl Into<String>) -> ConsoleOutput {
    ConsoleOutput::Reply(text.into())
}

/// Human-readable rendering of a service reply.
pub fn render(reply: &AppReply) -> String {
    match reply {
        AppReply::ThresholdUpdated {
            sensor,
            bound,
            value,
        } => format!("Threshold updated successfully: {sensor} {bound:?} = {value}"),
        AppReply::ThresholdRejected {
            sensor,
            bound,
            value,
            reason,
        } => format!("Threshold update failed: {sensor} {bound:?} = {value} ({reason})"),
        AppReply::Triggered { actuator, active } => {
            format!("{actuator} {}", if *active { "activated" } else { "deactivated" })
        }
        AppReply::TriggerFailed {
            actuator, reason, ..
        } => format!("{actuator} not changed: {reason}"),
        AppReply::Status(report) => report.to_string(),
        AppReply::Configuration(report) => report.to_string(),
    }
}
