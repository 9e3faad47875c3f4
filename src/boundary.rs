//! Input envelopes: maximum stick deflection as a function of angle
//!
//! Physical sticks rarely travel in a perfect circle. The emulation core
//! describes each control's envelope as a radius lookup by angle, and the
//! joystick tracker clamps touch deflection to it.
//!
//! Angles arrive as `atan2(y, x) + 2π`, so they are always non-negative and
//! lie in `[π, 3π]`. Implementations may rely on that when taking a
//! remainder.

use crate::controls::ControlId;
use std::f64::consts::{PI, TAU};

/// Radius of a control's input envelope at a given angle
pub trait InputRadius {
    fn radius_at_angle(&self, control: ControlId, angle: f64) -> f64;
}

impl<F> InputRadius for F
where
    F: Fn(ControlId, f64) -> f64,
{
    fn radius_at_angle(&self, control: ControlId, angle: f64) -> f64 {
        self(control, angle)
    }
}

/// Same radius in every direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularBoundary {
    pub radius: f64,
}

impl CircularBoundary {
    pub const fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Default for CircularBoundary {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl InputRadius for CircularBoundary {
    fn radius_at_angle(&self, _control: ControlId, _angle: f64) -> f64 {
        self.radius
    }
}

/// Regular polygon gate with a vertex on the positive x axis
///
/// With eight sides this is the octagonal gate of a GameCube stick: full
/// `radius` at the vertices, `radius * cos(π/8)` in the middle of each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonBoundary {
    pub sides: u32,
    pub radius: f64,
}

impl PolygonBoundary {
    pub const fn new(sides: u32, radius: f64) -> Self {
        Self { sides, radius }
    }

    pub const fn octagon(radius: f64) -> Self {
        Self::new(8, radius)
    }
}

impl InputRadius for PolygonBoundary {
    fn radius_at_angle(&self, _control: ControlId, angle: f64) -> f64 {
        if self.sides < 3 {
            return self.radius;
        }
        let section = TAU / f64::from(self.sides);
        // `%` truncates like fmod, which is why the angle must not be negative
        (section / 2.0).cos() / ((angle % section) - section / 2.0).cos() * self.radius
    }
}

/// Envelope chosen at configuration time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    Circle(CircularBoundary),
    Polygon(PolygonBoundary),
}

impl InputRadius for Boundary {
    fn radius_at_angle(&self, control: ControlId, angle: f64) -> f64 {
        match self {
            Self::Circle(b) => b.radius_at_angle(control, angle),
            Self::Polygon(b) => b.radius_at_angle(control, angle),
        }
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::Circle(CircularBoundary::default())
    }
}

/// Angle convention shared with the boundary lookup: `atan2(y, x) + 2π`
pub fn stick_angle(y: f64, x: f64) -> f64 {
    y.atan2(x) + PI + PI
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_angle_convention_is_positive() {
        assert!((stick_angle(0.0, 1.0) - TAU).abs() < EPS);
        assert!((stick_angle(0.0, -1.0) - 3.0 * PI).abs() < EPS);
        assert!((stick_angle(-1.0, 0.0) - 1.5 * PI).abs() < EPS);
        assert!(stick_angle(-1e-12, -1.0) > 0.0);
    }

    #[test]
    fn test_octagon_vertices_and_edges() {
        let gate = PolygonBoundary::octagon(1.0);
        let id = ControlId::STICK_MAIN;

        // Vertex on +x
        assert!((gate.radius_at_angle(id, stick_angle(0.0, 1.0)) - 1.0).abs() < 1e-6);
        // Vertex on the diagonal
        let diag = stick_angle(1.0, 1.0);
        assert!((gate.radius_at_angle(id, diag) - 1.0).abs() < 1e-6);
        // Middle of an edge is pulled in
        let mid = stick_angle((PI / 8.0).sin(), (PI / 8.0).cos());
        let expected = (PI / 8.0).cos();
        assert!((gate.radius_at_angle(id, mid) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_closure_boundary() {
        let boundary = |control: ControlId, _angle: f64| if control == ControlId::STICK_C { 0.5 } else { 1.0 };
        assert_eq!(boundary.radius_at_angle(ControlId::STICK_C, 0.0), 0.5);
        assert_eq!(boundary.radius_at_angle(ControlId::STICK_MAIN, 0.0), 1.0);
    }

    #[test]
    fn test_degenerate_polygon_is_circular() {
        let gate = PolygonBoundary::new(2, 0.7);
        assert_eq!(gate.radius_at_angle(ControlId::STICK_MAIN, 4.0), 0.7);
    }
}
