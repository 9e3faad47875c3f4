//! Touch overlay: the set of on-screen controls for one game session
//!
//! The overlay owns every tracker, routes touch events to them, and pushes
//! their axis values to the controller sink. In layout-edit mode touches
//! drag controls around instead of driving them.

pub mod joystick;
pub mod pointer;

#[cfg(test)]
mod tests;

use tracing::{debug, info};

use crate::boundary::Boundary;
use crate::config::AppConfig;
use crate::controls::ControlId;
use crate::sink::ControllerSink;
use crate::touch::{PointerId, TouchAction, TouchEvent};

pub use joystick::{JoystickTracker, JoystickVisuals, Layer, TouchContext};
pub use pointer::{PointerTimer, PointerTracker, DOUBLE_TAP_PULSE_MS, DOUBLE_TAP_WINDOW_MS};

/// What touches currently do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    /// Touches drive controls
    #[default]
    Gameplay,
    /// Touches move controls around
    LayoutEdit,
}

/// User-adjustable settings applied to every control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySettings {
    pub relative_center: bool,
    pub opacity: u8,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            relative_center: false,
            opacity: u8::MAX,
        }
    }
}

/// All on-screen controls of one session
#[derive(Debug)]
pub struct Overlay {
    joysticks: Vec<JoystickTracker>,
    pointer: Option<PointerTracker>,
    /// Output tags for the pointer's four slots
    pointer_axes: [ControlId; 4],
    boundary: Boundary,
    settings: OverlaySettings,
    mode: OverlayMode,
    /// Joystick being dragged in layout-edit mode
    dragging: Option<usize>,
}

impl Overlay {
    pub fn new(boundary: Boundary, settings: OverlaySettings) -> Self {
        Self {
            joysticks: Vec::new(),
            pointer: None,
            pointer_axes: ControlId::WIIMOTE_IR.sequential_axes(),
            boundary,
            settings,
            mode: OverlayMode::Gameplay,
            dragging: None,
        }
    }

    /// Build every control described by a validated config
    pub fn from_config(config: &AppConfig) -> Self {
        let settings = OverlaySettings {
            relative_center: config.overlay.relative_center,
            opacity: config.overlay.opacity_u8(),
        };
        let mut overlay = Self::new(config.overlay.boundary.into(), settings);

        for joystick in &config.joysticks {
            overlay.add_joystick(JoystickTracker::new(
                joystick.outer,
                joystick.inner,
                joystick.control.id(),
                joystick.emulation,
            ));
        }

        if let Some(pointer) = &config.pointer {
            overlay.set_pointer(PointerTracker::new(
                pointer.surface,
                pointer.double_tap.id(),
                config.overlay.game_aspect_ratio,
            ));
        }

        info!(
            "Overlay ready: {} joystick(s), pointer {}",
            overlay.joysticks.len(),
            if overlay.pointer.is_some() { "enabled" } else { "disabled" }
        );
        overlay
    }

    pub fn add_joystick(&mut self, mut joystick: JoystickTracker) {
        joystick.set_opacity(self.settings.opacity);
        self.joysticks.push(joystick);
    }

    /// Install the pointer surface, dropping any previous one and its timers
    pub fn set_pointer(&mut self, pointer: PointerTracker) {
        if let Some(mut old) = self.pointer.replace(pointer) {
            old.cancel_pending();
        }
    }

    /// Route one touch event observed at `now_ms`.
    ///
    /// Returns `true` if any control consumed it.
    pub fn handle_touch(&mut self, event: &TouchEvent, now_ms: u64, sink: &mut dyn ControllerSink) -> bool {
        match self.mode {
            OverlayMode::Gameplay => self.drive_controls(event, now_ms, sink),
            OverlayMode::LayoutEdit => self.configure_touch(event),
        }
    }

    fn drive_controls(&mut self, event: &TouchEvent, now_ms: u64, sink: &mut dyn ControllerSink) -> bool {
        let ctx = TouchContext {
            relative_center: self.settings.relative_center,
            boundary: &self.boundary,
        };

        let mut consumed = false;
        for joystick in &mut self.joysticks {
            if joystick.handle_touch(event, ctx) {
                emit_axes(sink, joystick.axis_ids(), joystick.axis_values());
                consumed = true;
            }
        }

        let Some(pointer) = self.pointer.as_mut() else {
            return consumed;
        };

        // Fingers held by a joystick never reach the pointer
        let acting = event.action_pointer().map(|p| p.id);
        let held = acting.is_some_and(|id| self.joysticks.iter().any(|j| j.track_id() == Some(id)));
        if held {
            pointer.advance(now_ms, sink);
            return consumed;
        }

        if pointer.handle_touch(event, now_ms, sink) {
            emit_axes(sink, self.pointer_axes, pointer.axis_values());
            consumed = true;
        }
        consumed
    }

    /// Layout-edit routing: a `Down` grabs the first control under the
    /// finger, moves drag it, lifting the finger lets go
    fn configure_touch(&mut self, event: &TouchEvent) -> bool {
        match event.action {
            TouchAction::Down => {
                let Some(sample) = event.action_pointer() else {
                    return false;
                };
                let (x, y) = (sample.x as i32, sample.y as i32);
                self.dragging = self.joysticks.iter().position(|j| j.bounds().contains(x, y));
                if let Some(idx) = self.dragging {
                    debug!("Editing joystick {}", self.joysticks[idx].control());
                }
            }
            TouchAction::Up | TouchAction::PointerUp => {
                let dragged = self.dragging.take().is_some();
                return dragged;
            }
            TouchAction::PointerDown | TouchAction::Move => {}
        }

        match self.dragging.and_then(|idx| self.joysticks.get_mut(idx)) {
            Some(joystick) => {
                joystick.configure_touch(event);
                true
            }
            None => false,
        }
    }

    /// Fire timers due at or before `now_ms`
    pub fn advance(&mut self, now_ms: u64, sink: &mut dyn ControllerSink) -> usize {
        self.pointer.as_mut().map_or(0, |p| p.advance(now_ms, sink))
    }

    /// When [`Overlay::advance`] next has work to do
    pub fn next_deadline(&self) -> Option<u64> {
        self.pointer.as_ref().and_then(|p| p.next_deadline())
    }

    /// Drop pending timers; call before discarding the overlay mid-session
    pub fn shutdown(&mut self) {
        if let Some(pointer) = self.pointer.as_mut() {
            pointer.cancel_pending();
        }
    }

    pub fn set_mode(&mut self, mode: OverlayMode) {
        if self.mode != mode {
            info!("Overlay mode: {:?}", mode);
        }
        self.mode = mode;
        self.dragging = None;
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    pub fn set_relative_center(&mut self, enabled: bool) {
        self.settings.relative_center = enabled;
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.settings.opacity = opacity;
        for joystick in &mut self.joysticks {
            joystick.set_opacity(opacity);
        }
    }

    /// Apply settings that can change without rebuilding controls
    pub fn apply_settings(&mut self, settings: OverlaySettings) {
        self.set_relative_center(settings.relative_center);
        if settings.opacity != self.settings.opacity {
            self.set_opacity(settings.opacity);
        }
    }

    pub fn settings(&self) -> OverlaySettings {
        self.settings
    }

    pub fn joysticks(&self) -> &[JoystickTracker] {
        &self.joysticks
    }

    pub fn pointer(&self) -> Option<&PointerTracker> {
        self.pointer.as_ref()
    }

    /// Which control (if any) holds a finger
    pub fn is_touch_consumed(&self, id: PointerId) -> bool {
        self.joysticks.iter().any(|j| j.track_id() == Some(id))
            || self.pointer.as_ref().is_some_and(|p| p.track_id() == Some(id))
    }

    /// Render state of every joystick, in creation order
    pub fn visuals(&self) -> Vec<JoystickVisuals> {
        self.joysticks.iter().map(JoystickTracker::visuals).collect()
    }
}

fn emit_axes(sink: &mut dyn ControllerSink, ids: [ControlId; 4], values: [f32; 4]) {
    for (id, value) in ids.into_iter().zip(values) {
        sink.on_axis(id, value);
    }
}
