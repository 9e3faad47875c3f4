//! Absolute pointer emulation over the game surface
//!
//! The tracked finger's position is mapped onto the visible game picture:
//! the center of the picture is `(0, 0)` and its edges are `±1`, after
//! accounting for letterbox bars. A second tap shortly after a first one
//! synthesizes a short press of a configurable button.

use crate::controls::{ButtonState, ControlId};
use crate::geometry::Rect;
use crate::sink::ControllerSink;
use crate::timer::TimerQueue;
use crate::touch::{PointerId, TouchAction, TouchEvent};
use tracing::{debug, trace, warn};

/// How long after a first tap a second one counts as a double tap
pub const DOUBLE_TAP_WINDOW_MS: u64 = 300;

/// Length of the synthesized button press
pub const DOUBLE_TAP_PULSE_MS: u64 = 50;

/// Deferred work owned by a [`PointerTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTimer {
    /// Close the double-tap window
    DisarmDoubleTap,
    /// End the synthesized press
    Release(ControlId),
}

/// Touch tracking and double-tap detection for the pointer surface
#[derive(Debug)]
pub struct PointerTracker {
    /// Normalized deflection as (y, x)
    axes: [f32; 2],

    game_center_x: f32,
    game_center_y: f32,
    game_width_half_inv: f32,
    game_height_half_inv: f32,

    double_tap_armed: bool,
    double_tap_button: ControlId,
    track_id: Option<PointerId>,
    timers: TimerQueue<PointerTimer>,
}

impl PointerTracker {
    /// Map `surface` onto the game picture for a game of `game_aspect_ratio`.
    ///
    /// If the game is narrower than the surface the picture has bars on the
    /// left and right, otherwise on the top and bottom. A non-positive or
    /// non-finite ratio is treated as "fills the surface".
    pub fn new(surface: Rect, double_tap_button: ControlId, game_aspect_ratio: f32) -> Self {
        let game_center_x = (surface.left + surface.right) as f32 / 2.0;
        let game_center_y = (surface.top + surface.bottom) as f32 / 2.0;

        let mut game_width = surface.width() as f32;
        let mut game_height = surface.height() as f32;
        let surface_ratio = game_width / game_height;

        let game_ratio = if game_aspect_ratio.is_finite() && game_aspect_ratio > 0.0 {
            game_aspect_ratio
        } else {
            warn!(
                "Invalid game aspect ratio {}, assuming it matches the surface",
                game_aspect_ratio
            );
            surface_ratio
        };

        if game_ratio <= surface_ratio {
            // Black bars on left/right
            game_width = game_height * game_ratio;
        } else {
            // Black bars on top/bottom
            game_height = game_width / game_ratio;
        }

        debug!(
            "Pointer surface {} -> game area {:.1}x{:.1} (aspect {:.3})",
            surface, game_width, game_height, game_ratio
        );

        Self {
            axes: [0.0, 0.0],
            game_center_x,
            game_center_y,
            game_width_half_inv: half_extent_inverse(game_width),
            game_height_half_inv: half_extent_inverse(game_height),
            double_tap_armed: false,
            double_tap_button,
            track_id: None,
            timers: TimerQueue::new(),
        }
    }

    /// Feed one touch event observed at `now_ms`.
    ///
    /// Timers due at or before `now_ms` fire first. Returns `true` if the
    /// event adopted, released or moved the tracked finger.
    pub fn handle_touch(&mut self, event: &TouchEvent, now_ms: u64, sink: &mut dyn ControllerSink) -> bool {
        self.advance(now_ms, sink);

        let mut consumed = false;
        match event.action {
            TouchAction::Down | TouchAction::PointerDown => {
                if let Some(sample) = event.action_pointer() {
                    self.track_id = Some(sample.id);
                    consumed = true;
                    self.touch_press(now_ms, sink);
                }
            }
            TouchAction::Up | TouchAction::PointerUp => {
                if let Some(sample) = event.action_pointer() {
                    if self.track_id == Some(sample.id) {
                        debug!("Pointer released {}", sample.id);
                        // Axes keep their last value
                        self.track_id = None;
                        consumed = true;
                    }
                }
            }
            TouchAction::Move => {}
        }

        let Some(track_id) = self.track_id else {
            return consumed;
        };

        match event.find(track_id) {
            Some(sample) => {
                self.axes = [
                    (sample.y - self.game_center_y) * self.game_height_half_inv,
                    (sample.x - self.game_center_x) * self.game_width_half_inv,
                ];
                trace!("Pointer axes y={:.3} x={:.3}", self.axes[0], self.axes[1]);
                true
            }
            None => {
                debug!("Tracked pointer {} missing from event, axes unchanged", track_id);
                consumed
            }
        }
    }

    fn touch_press(&mut self, now_ms: u64, sink: &mut dyn ControllerSink) {
        if self.double_tap_armed {
            debug!("Double tap -> {}", self.double_tap_button);
            sink.on_button(self.double_tap_button, ButtonState::Pressed);
            self.timers
                .schedule(now_ms, DOUBLE_TAP_PULSE_MS, PointerTimer::Release(self.double_tap_button));
        } else {
            self.double_tap_armed = true;
            self.timers
                .schedule(now_ms, DOUBLE_TAP_WINDOW_MS, PointerTimer::DisarmDoubleTap);
        }
    }

    /// Fire every timer due at or before `now_ms`, in deadline order.
    ///
    /// Returns how many fired.
    pub fn advance(&mut self, now_ms: u64, sink: &mut dyn ControllerSink) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now_ms) {
            match timer {
                PointerTimer::DisarmDoubleTap => {
                    self.double_tap_armed = false;
                }
                PointerTimer::Release(button) => {
                    sink.on_button(button, ButtonState::Released);
                }
            }
            fired += 1;
        }
        fired
    }

    /// When the next timer becomes due, if any
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Drop pending timers without firing them
    pub fn cancel_pending(&mut self) {
        if !self.timers.is_empty() {
            debug!("Dropping {} pending pointer timers", self.timers.len());
        }
        self.timers.clear();
    }

    /// Current output in `(up, down, left, right)` slot order; each axis
    /// fills both slots of its pair
    pub fn axis_values(&self) -> [f32; 4] {
        let [y, x] = self.axes;
        [y, y, x, x]
    }

    pub fn raw_axes(&self) -> [f32; 2] {
        self.axes
    }

    pub fn track_id(&self) -> Option<PointerId> {
        self.track_id
    }

    pub fn is_double_tap_armed(&self) -> bool {
        self.double_tap_armed
    }

    pub fn double_tap_button(&self) -> ControlId {
        self.double_tap_button
    }

    /// Center of the game picture in surface pixels
    pub fn game_center(&self) -> (f32, f32) {
        (self.game_center_x, self.game_center_y)
    }
}

/// `1 / (extent / 2)`, or 0 for a collapsed extent
fn half_extent_inverse(extent: f32) -> f32 {
    if extent > 0.0 && extent.is_finite() {
        1.0 / (extent * 0.5)
    } else {
        0.0
    }
}
