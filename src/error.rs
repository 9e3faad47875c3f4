//! Validation errors for overlay layouts and scripts

use crate::geometry::Rect;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OverlayError {
    #[error("{what} rectangle {rect} has no area")]
    EmptyRect { what: String, rect: Rect },

    #[error("opacity {0} is out of range (must be 0-255)")]
    InvalidOpacity(u16),

    #[error("game aspect ratio {0} must be a positive finite number")]
    InvalidAspectRatio(f32),

    #[error("boundary radius {0} must be a positive finite number")]
    InvalidBoundaryRadius(f64),

    #[error("step {step}: pointer {pointer} is not down")]
    PointerNotDown { step: usize, pointer: u32 },

    #[error("step {step}: time {at}ms is earlier than the previous step ({previous}ms)")]
    TimeWentBackwards { step: usize, at: u64, previous: u64 },
}
