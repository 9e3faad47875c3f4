//! Touch Overlay - on-screen joystick and pointer tracking
//!
//! Converts multi-touch input into normalized controller axes and button
//! events for a virtual game-controller overlay.

pub mod boundary;
pub mod cli;
pub mod config;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod replay;
pub mod sink;
pub mod timer;
pub mod touch;

pub use config::AppConfig;
pub use error::OverlayError;
pub use overlay::{JoystickTracker, Overlay, OverlayMode, OverlaySettings, PointerTracker};
pub use sink::{ControllerSink, RecordingSink};
