//! Destination for synthesized controller input

use crate::controls::{ButtonState, ControlId};
use serde::Serialize;
use tracing::{debug, trace};

/// Receives button and axis values for the emulated device
pub trait ControllerSink {
    fn on_button(&mut self, button: ControlId, state: ButtonState);
    fn on_axis(&mut self, axis: ControlId, value: f32);
}

/// One value delivered to a sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkEvent {
    Button { id: ControlId, state: ButtonState },
    Axis { id: ControlId, value: f32 },
}

/// Sink that keeps everything it receives, in order
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Button transitions only
    pub fn buttons(&self) -> Vec<(ControlId, ButtonState)> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                SinkEvent::Button { id, state } => Some((id, state)),
                SinkEvent::Axis { .. } => None,
            })
            .collect()
    }

    /// Most recent value written to `axis`
    pub fn last_axis(&self, axis: ControlId) -> Option<f32> {
        self.events.iter().rev().find_map(|e| match *e {
            SinkEvent::Axis { id, value } if id == axis => Some(value),
            _ => None,
        })
    }

    pub fn take(&mut self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ControllerSink for RecordingSink {
    fn on_button(&mut self, button: ControlId, state: ButtonState) {
        self.events.push(SinkEvent::Button { id: button, state });
    }

    fn on_axis(&mut self, axis: ControlId, value: f32) {
        self.events.push(SinkEvent::Axis { id: axis, value });
    }
}

/// Sink that only logs, used when no emulation core is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl ControllerSink for LoggingSink {
    fn on_button(&mut self, button: ControlId, state: ButtonState) {
        debug!("Button {} -> {:?}", button, state);
    }

    fn on_axis(&mut self, axis: ControlId, value: f32) {
        trace!("Axis {} -> {:.3}", axis, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_queries() {
        let mut sink = RecordingSink::new();
        sink.on_axis(ControlId(11), 0.25);
        sink.on_button(ControlId::WIIMOTE_BUTTON_A, ButtonState::Pressed);
        sink.on_axis(ControlId(11), -0.5);

        assert_eq!(sink.last_axis(ControlId(11)), Some(-0.5));
        assert_eq!(sink.last_axis(ControlId(12)), None);
        assert_eq!(sink.buttons(), vec![(ControlId::WIIMOTE_BUTTON_A, ButtonState::Pressed)]);
        assert_eq!(sink.take().len(), 3);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_sink_event_json_shape() {
        let event = SinkEvent::Button {
            id: ControlId::WIIMOTE_BUTTON_B,
            state: ButtonState::Released,
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["kind"], "button");
        assert_eq!(json["id"], 101);
        assert_eq!(json["state"], "released");
    }
}
