//! On-screen joystick tracking
//!
//! A joystick follows exactly one finger: the first one that lands inside
//! its outer ring. Deflection is measured against the *virtual* bounds,
//! which can be re-centered under the finger on touch-down, and is clamped
//! to the control's input envelope before the knob is drawn.
//!
//! Output uses a fixed four-slot layout `(up, down, left, right)` whose tags
//! come from [`JoystickTracker::axis_ids`].

use crate::boundary::{stick_angle, InputRadius};
use crate::controls::{ControlId, EmulationMode};
use crate::geometry::Rect;
use crate::touch::{PointerId, PointerSample, TouchAction, TouchEvent};
use tracing::{debug, trace};

/// Boundary multiplier for the IR pointing mode, to allow overscan
const POINTING_OVERSCAN: f64 = 3.0;

/// Collaborator state a joystick needs while handling a touch
#[derive(Clone, Copy)]
pub struct TouchContext<'a> {
    /// Re-center the virtual bounds under the finger on touch-down
    pub relative_center: bool,
    /// Input envelope supplied by the emulation core
    pub boundary: &'a dyn InputRadius,
}

/// A drawable piece of the joystick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    pub bounds: Rect,
    pub alpha: u8,
}

/// Everything a renderer needs to draw the joystick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickVisuals {
    /// Resting ring, hidden while a finger is tracked
    pub outer: Layer,
    /// Knob; draw the pressed variant when `inner_pressed` is set
    pub inner: Layer,
    pub inner_pressed: bool,
    /// Outline of the virtual bounds, shown only while tracked
    pub bounds_box: Layer,
}

/// Touch tracking and axis state for one on-screen joystick
#[derive(Debug, Clone)]
pub struct JoystickTracker {
    control: ControlId,
    emulation: EmulationMode,
    axis_ids: [ControlId; 4],
    /// Raw deflection as (y, x)
    axes: [f32; 2],
    /// Per-mode (y, x) multipliers
    factors: [f32; 2],
    track_id: Option<PointerId>,

    control_origin: (i32, i32),
    previous_touch: (i32, i32),
    /// Intrinsic size of the outer ring
    outer_size: (i32, i32),
    knob_half: (i32, i32),

    outer_bounds: Rect,
    virt_bounds: Rect,
    orig_bounds: Rect,
    inner_bounds: Rect,
    box_bounds: Rect,

    pressed: bool,
    opacity: u8,
    outer_alpha: u8,
    box_alpha: u8,
}

impl JoystickTracker {
    /// Create a joystick resting at `outer` with its knob sized like `inner`.
    ///
    /// `emulation` only changes scaling and axis tags for
    /// [`ControlId::STICK_EMULATION`]; other sticks use the four tags that
    /// follow their own id.
    pub fn new(outer: Rect, inner: Rect, control: ControlId, emulation: EmulationMode) -> Self {
        let direct = control == ControlId::STICK_EMULATION;
        let (axis_ids, factors) = if direct {
            (emulation.axis_ids(), emulation.scale_factors())
        } else {
            (control.sequential_axes(), [1.0, 1.0])
        };

        let mut joystick = Self {
            control,
            emulation,
            axis_ids,
            axes: [0.0, 0.0],
            factors,
            track_id: None,
            control_origin: (outer.left, outer.top),
            previous_touch: (0, 0),
            outer_size: (outer.width(), outer.height()),
            knob_half: (inner.width() / 2, inner.height() / 2),
            outer_bounds: outer,
            virt_bounds: outer,
            orig_bounds: outer,
            inner_bounds: inner,
            box_bounds: outer,
            pressed: false,
            opacity: u8::MAX,
            outer_alpha: u8::MAX,
            box_alpha: 0,
        };
        joystick.position_knob(0.0, 0.0);

        debug!(
            "Joystick {} created at {} (mode: {}, axes: {:?})",
            control, outer, emulation, axis_ids
        );
        joystick
    }

    /// Whether this stick is reinterpreted through an emulation mode
    pub fn is_direct_stick(&self) -> bool {
        self.control == ControlId::STICK_EMULATION
    }

    /// Feed one gameplay touch event.
    ///
    /// Returns `true` when the event counts as a press for this joystick:
    /// a touch-down inside the ring, release of the tracked finger, or any
    /// move while this is the emulation stick.
    pub fn handle_touch(&mut self, event: &TouchEvent, ctx: TouchContext<'_>) -> bool {
        let mut pressed = false;

        match event.action {
            TouchAction::Down | TouchAction::PointerDown => {
                if let Some(sample) = event.action_pointer() {
                    pressed = self.try_begin_tracking(sample, ctx.relative_center);
                }
            }
            TouchAction::Move => {
                if self.is_direct_stick() {
                    pressed = true;
                }
            }
            TouchAction::Up | TouchAction::PointerUp => {
                if let Some(sample) = event.action_pointer() {
                    if self.track_id == Some(sample.id) {
                        self.release();
                        pressed = true;
                    }
                }
            }
        }

        let Some(track_id) = self.track_id else {
            return pressed;
        };

        match event.find(track_id) {
            Some(sample) => {
                self.update_axes(sample);
                self.clamp_and_position(ctx.boundary);
            }
            None => debug!("Tracked pointer {} missing from event, axes unchanged", track_id),
        }
        pressed
    }

    fn try_begin_tracking(&mut self, sample: &PointerSample, relative_center: bool) -> bool {
        let (x, y) = (sample.x as i32, sample.y as i32);
        if !self.outer_bounds.contains(x, y) {
            return false;
        }

        self.pressed = true;
        self.outer_alpha = 0;
        self.box_alpha = self.opacity;
        if relative_center {
            self.virt_bounds = self.virt_bounds.centered_on(x, y);
        }
        self.box_bounds = self.virt_bounds;
        self.track_id = Some(sample.id);

        debug!("Joystick {} tracking {} at ({}, {})", self.control, sample.id, x, y);
        true
    }

    fn release(&mut self) {
        debug!("Joystick {} released {:?}", self.control, self.track_id);

        self.pressed = false;
        self.axes = [0.0, 0.0];
        self.outer_alpha = self.opacity;
        self.box_alpha = 0;
        self.virt_bounds = self.orig_bounds;
        self.outer_bounds = self.orig_bounds;
        self.position_knob(0.0, 0.0);
        self.track_id = None;
    }

    /// Normalize a touch against the virtual bounds (center = 0, edge = 1)
    fn update_axes(&mut self, sample: &PointerSample) {
        let virt = self.virt_bounds;
        let center_x = virt.center_x() as f32;
        let center_y = virt.center_y() as f32;

        let axis_y = axis_ratio(sample.y - center_y, virt.bottom as f32 - center_y);
        let axis_x = axis_ratio(sample.x - center_x, virt.right as f32 - center_x);
        self.axes = [axis_y, axis_x];

        trace!("Joystick {} raw axes y={:.3} x={:.3}", self.control, axis_y, axis_x);
    }

    /// Clamp the raw axes to the input envelope and move the knob there.
    ///
    /// Deflection already inside the envelope is left untouched; anything
    /// beyond it is pulled back onto the envelope at the same angle.
    pub fn clamp_and_position(&mut self, boundary: &dyn InputRadius) {
        let mut y = f64::from(self.axes[0]);
        let mut x = f64::from(self.axes[1]);

        let angle = stick_angle(y, x);
        let radius = y.hypot(x);
        let mut max_radius = boundary.radius_at_angle(self.control, angle);
        if self.emulation == EmulationMode::WiimotePointing {
            max_radius *= POINTING_OVERSCAN;
        }

        if radius > max_radius {
            y = max_radius * angle.sin();
            x = max_radius * angle.cos();
            self.axes = [y as f32, x as f32];
            trace!("Joystick {} clamped to radius {:.3}", self.control, max_radius);
        }

        self.position_knob(x, y);
    }

    /// Center the knob on the pixel matching deflection `(x, y)`
    fn position_knob(&mut self, x: f64, y: f64) {
        let virt = self.virt_bounds;
        let pixel_x = virt.center_x() + (x * f64::from(virt.width() / 2)) as i32;
        let pixel_y = virt.center_y() + (y * f64::from(virt.height() / 2)) as i32;

        let (half_w, half_h) = self.knob_half;
        self.inner_bounds = Rect::new(pixel_x - half_w, pixel_y - half_h, pixel_x + half_w, pixel_y + half_h);
    }

    /// Current output in `(up, down, left, right)` slot order.
    ///
    /// Each raw axis is written into both slots of its pair. The emulation
    /// stick applies its mode's scale (after taking magnitudes for shake
    /// modes); other sticks only cap each slot.
    pub fn axis_values(&self) -> [f32; 4] {
        let [mut y, mut x] = self.axes;

        if self.is_direct_stick() {
            if self.emulation.is_shake() {
                y = y.abs();
                x = x.abs();
            }
            let [factor_y, factor_x] = self.factors;
            [y * factor_y, y * factor_y, x * factor_x, x * factor_x]
        } else {
            [y.min(0.0), y.min(1.0), x.min(0.0), x.min(1.0)]
        }
    }

    /// Drag the control while the overlay is in layout-edit mode.
    ///
    /// Only the primary `Down` and `Move` take part. Each move shifts the
    /// control by the delta since the previous sample.
    pub fn configure_touch(&mut self, event: &TouchEvent) {
        let Some(sample) = event.action_pointer() else {
            return;
        };
        let finger = (sample.x as i32, sample.y as i32);

        match event.action {
            TouchAction::Down => {
                self.previous_touch = finger;
            }
            TouchAction::Move => {
                let delta_x = finger.0 - self.previous_touch.0;
                let delta_y = finger.1 - self.previous_touch.1;
                self.control_origin.0 += delta_x;
                self.control_origin.1 += delta_y;

                let rect = Rect::from_origin_size(
                    self.control_origin.0,
                    self.control_origin.1,
                    self.outer_size.0,
                    self.outer_size.1,
                );
                self.outer_bounds = rect;
                self.virt_bounds = rect;
                self.box_bounds = rect;
                let [y, x] = self.axes;
                self.position_knob(f64::from(x), f64::from(y));
                self.orig_bounds = rect;
                self.previous_touch = finger;

                trace!("Joystick {} dragged to {}", self.control, rect);
            }
            _ => {}
        }
    }

    /// Apply overlay opacity.
    ///
    /// The knob always uses it. The ring and the bounds box swap visibility
    /// depending on whether a finger is tracked.
    pub fn set_opacity(&mut self, value: u8) {
        self.opacity = value;
        if self.track_id.is_none() {
            self.outer_alpha = value;
            self.box_alpha = 0;
        } else {
            self.outer_alpha = 0;
            self.box_alpha = value;
        }
    }

    /// Set the top-left corner used as the layout-edit drag origin
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.control_origin = (x, y);
    }

    /// Move the outer ring (hit-test area)
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.outer_bounds = bounds;
    }

    pub fn visuals(&self) -> JoystickVisuals {
        JoystickVisuals {
            outer: Layer {
                bounds: self.outer_bounds,
                alpha: self.outer_alpha,
            },
            inner: Layer {
                bounds: self.inner_bounds,
                alpha: self.opacity,
            },
            inner_pressed: self.pressed,
            bounds_box: Layer {
                bounds: self.box_bounds,
                alpha: self.box_alpha,
            },
        }
    }

    pub fn control(&self) -> ControlId {
        self.control
    }

    pub fn emulation(&self) -> EmulationMode {
        self.emulation
    }

    pub fn axis_ids(&self) -> [ControlId; 4] {
        self.axis_ids
    }

    /// Unscaled deflection as (y, x)
    pub fn raw_axes(&self) -> [f32; 2] {
        self.axes
    }

    pub fn track_id(&self) -> Option<PointerId> {
        self.track_id
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn bounds(&self) -> Rect {
        self.outer_bounds
    }

    pub fn virtual_bounds(&self) -> Rect {
        self.virt_bounds
    }

    pub fn original_bounds(&self) -> Rect {
        self.orig_bounds
    }

    pub fn inner_bounds(&self) -> Rect {
        self.inner_bounds
    }

    pub fn control_origin(&self) -> (i32, i32) {
        self.control_origin
    }

    pub fn width(&self) -> i32 {
        self.outer_size.0
    }

    pub fn height(&self) -> i32 {
        self.outer_size.1
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }
}

/// `offset / extent`, or 0 when the extent collapsed
fn axis_ratio(offset: f32, extent: f32) -> f32 {
    if extent == 0.0 {
        return 0.0;
    }
    let value = offset / extent;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
