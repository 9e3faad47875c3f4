//! Scripted touch sessions
//!
//! A replay script is a YAML list of finger updates with timestamps. It is
//! turned into well-formed touch events and pushed through an [`Overlay`],
//! firing timers at their exact deadlines, so a session always produces
//! the same controller output.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::controls::{ButtonState, ControlId};
use crate::error::OverlayError;
use crate::overlay::Overlay;
use crate::sink::{ControllerSink, SinkEvent};
use crate::touch::{ActivePointers, PointerId, TouchEvent};

/// What a script step does to its finger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Down,
    Move,
    Up,
}

/// One finger update
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReplayStep {
    /// Milliseconds since the start of the session
    pub at: u64,
    pub action: StepAction,
    pub pointer: u32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReplayScript {
    pub steps: Vec<ReplayStep>,
}

/// A sink value stamped with the time it was produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReplayRecord {
    pub at: u64,
    #[serde(flatten)]
    pub event: SinkEvent,
}

impl ReplayScript {
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read replay script: {}", path))?;

        Self::from_yaml(&contents).with_context(|| format!("Invalid replay script: {}", path))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let script: ReplayScript = serde_yaml::from_str(contents).context("Failed to parse replay script")?;
        Ok(script)
    }

    /// Build the touch events for every step.
    ///
    /// Steps must be in time order, and moves/lifts must refer to a finger
    /// that is currently down.
    pub fn events(&self) -> Result<Vec<(u64, TouchEvent)>, OverlayError> {
        let mut active = ActivePointers::new();
        let mut events = Vec::with_capacity(self.steps.len());
        let mut previous = 0;

        for (step, entry) in self.steps.iter().enumerate() {
            if entry.at < previous {
                return Err(OverlayError::TimeWentBackwards {
                    step,
                    at: entry.at,
                    previous,
                });
            }
            previous = entry.at;

            let id = PointerId(entry.pointer);
            let not_down = || OverlayError::PointerNotDown {
                step,
                pointer: entry.pointer,
            };

            let event = match entry.action {
                StepAction::Down => active.press(id, entry.x, entry.y),
                StepAction::Move => {
                    if active.get(id).is_none() {
                        return Err(not_down());
                    }
                    active.move_to(id, entry.x, entry.y)
                }
                StepAction::Up => active.release(id).ok_or_else(not_down)?,
            };
            events.push((entry.at, event));
        }

        Ok(events)
    }

    /// Drive `overlay` through the whole script and collect its output.
    ///
    /// Timers still pending after the last step are fired as well.
    pub fn run(&self, overlay: &mut Overlay) -> Result<Vec<ReplayRecord>, OverlayError> {
        let events = self.events()?;
        let mut sink = StampedSink::default();

        for (at, event) in &events {
            fire_timers_until(overlay, &mut sink, *at);
            sink.now = *at;
            let consumed = overlay.handle_touch(event, *at, &mut sink);
            debug!("t={}ms {:?} consumed={}", at, event.action, consumed);
        }
        fire_timers_until(overlay, &mut sink, u64::MAX);

        info!(
            "Replayed {} step(s), {} controller event(s)",
            events.len(),
            sink.records.len()
        );
        Ok(sink.records)
    }
}

/// Fire timers one deadline at a time so each record gets its real time
fn fire_timers_until(overlay: &mut Overlay, sink: &mut StampedSink, limit: u64) {
    while let Some(deadline) = overlay.next_deadline().filter(|d| *d <= limit) {
        sink.now = deadline;
        overlay.advance(deadline, sink);
    }
}

#[derive(Debug, Default)]
struct StampedSink {
    now: u64,
    records: Vec<ReplayRecord>,
}

impl ControllerSink for StampedSink {
    fn on_button(&mut self, button: ControlId, state: ButtonState) {
        self.records.push(ReplayRecord {
            at: self.now,
            event: SinkEvent::Button { id: button, state },
        });
    }

    fn on_axis(&mut self, axis: ControlId, value: f32) {
        self.records.push(ReplayRecord {
            at: self.now,
            event: SinkEvent::Axis { id: axis, value },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::touch::TouchAction;
    use tempfile::TempDir;

    const LAYOUT: &str = r#"
joysticks:
  - control: stick_c
    outer: { left: 0, top: 0, right: 200, bottom: 200 }
    inner: { left: 80, top: 80, right: 120, bottom: 120 }
pointer:
  surface: { left: 400, top: 0, right: 800, bottom: 400 }
  double_tap: two
overlay:
  game_aspect_ratio: 1.0
"#;

    const DOUBLE_TAP: &str = r#"
steps:
  - { at: 0,   action: down, pointer: 0, x: 600, y: 200 }
  - { at: 40,  action: up,   pointer: 0 }
  - { at: 100, action: down, pointer: 1, x: 700, y: 200 }
  - { at: 120, action: up,   pointer: 1 }
"#;

    fn overlay() -> Overlay {
        Overlay::from_config(&AppConfig::from_yaml(LAYOUT).unwrap())
    }

    fn buttons(records: &[ReplayRecord]) -> Vec<(u64, ControlId, ButtonState)> {
        records
            .iter()
            .filter_map(|r| match r.event {
                SinkEvent::Button { id, state } => Some((r.at, id, state)),
                SinkEvent::Axis { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_events_pick_pointer_actions() {
        let script = ReplayScript::from_yaml(
            r#"
steps:
  - { at: 0, action: down, pointer: 0, x: 1, y: 1 }
  - { at: 5, action: down, pointer: 1, x: 2, y: 2 }
  - { at: 9, action: up, pointer: 0 }
  - { at: 9, action: up, pointer: 1 }
"#,
        )
        .unwrap();

        let actions: Vec<TouchAction> = script.events().unwrap().into_iter().map(|(_, e)| e.action).collect();
        assert_eq!(
            actions,
            vec![
                TouchAction::Down,
                TouchAction::PointerDown,
                TouchAction::PointerUp,
                TouchAction::Up
            ]
        );
    }

    #[test]
    fn test_rejects_lift_of_unknown_finger() {
        let script = ReplayScript::from_yaml("steps:\n  - { at: 0, action: up, pointer: 3 }\n").unwrap();
        assert_eq!(
            script.events(),
            Err(OverlayError::PointerNotDown { step: 0, pointer: 3 })
        );
    }

    #[test]
    fn test_rejects_time_going_backwards() {
        let script = ReplayScript::from_yaml(
            "steps:\n  - { at: 10, action: down, pointer: 0 }\n  - { at: 5, action: move, pointer: 0 }\n",
        )
        .unwrap();
        assert_eq!(
            script.events(),
            Err(OverlayError::TimeWentBackwards {
                step: 1,
                at: 5,
                previous: 10
            })
        );
    }

    #[test]
    fn test_double_tap_is_stamped_at_deadlines() {
        let script = ReplayScript::from_yaml(DOUBLE_TAP).unwrap();
        let records = script.run(&mut overlay()).unwrap();

        assert_eq!(
            buttons(&records),
            vec![
                (100, ControlId::WIIMOTE_BUTTON_2, ButtonState::Pressed),
                (150, ControlId::WIIMOTE_BUTTON_2, ButtonState::Released),
            ]
        );
    }

    #[test]
    fn test_pointer_output_uses_ir_tags() {
        let script = ReplayScript::from_yaml(DOUBLE_TAP).unwrap();
        let records = script.run(&mut overlay()).unwrap();

        let ir_right = ControlId::WIIMOTE_IR.sequential_axes()[3];
        let first = records
            .iter()
            .find(|r| matches!(r.event, SinkEvent::Axis { id, .. } if id == ir_right))
            .unwrap();
        assert_eq!(first.at, 0);
        assert_eq!(first.event, SinkEvent::Axis { id: ir_right, value: 0.0 });
    }

    #[test]
    fn test_record_json_shape() {
        let record = ReplayRecord {
            at: 150,
            event: SinkEvent::Button {
                id: ControlId::WIIMOTE_BUTTON_2,
                state: ButtonState::Released,
            },
        };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["at"], 150);
        assert_eq!(json["kind"], "button");
        assert_eq!(json["id"], 106);
    }

    #[tokio::test]
    async fn test_load_script_from_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("session.yaml");
        std::fs::write(&path, DOUBLE_TAP)?;

        let script = ReplayScript::load(&path.to_string_lossy()).await?;
        assert_eq!(script.steps.len(), 4);
        assert_eq!(script.steps[1].action, StepAction::Up);
        Ok(())
    }
}
