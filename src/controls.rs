//! Logical controller identifiers shared with the emulation core
//!
//! The emulation core addresses every button, stick and axis with an opaque
//! integer tag. Sticks reserve the four tags that follow their own id for
//! their up/down/left/right axes, so `stick + 1 ..= stick + 4` must never
//! collide with another control.

use serde::{Deserialize, Serialize};

/// Opaque control/axis tag understood by the controller event dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ControlId(pub i32);

impl ControlId {
    // GameCube
    pub const STICK_MAIN: Self = Self(10);
    pub const STICK_C: Self = Self(15);

    // Wii Remote
    pub const WIIMOTE_BUTTON_A: Self = Self(100);
    pub const WIIMOTE_BUTTON_B: Self = Self(101);
    pub const WIIMOTE_BUTTON_2: Self = Self(106);
    pub const WIIMOTE_IR: Self = Self(110);
    pub const WIIMOTE_SWING: Self = Self(116);
    pub const WIIMOTE_TILT: Self = Self(121);
    pub const WIIMOTE_SHAKE_X: Self = Self(126);
    pub const WIIMOTE_SHAKE_Y: Self = Self(127);
    pub const WIIMOTE_SHAKE_Z: Self = Self(128);

    // Nunchuk
    pub const NUNCHUK_STICK: Self = Self(202);
    pub const NUNCHUK_SWING: Self = Self(207);
    pub const NUNCHUK_TILT: Self = Self(212);
    pub const NUNCHUK_SHAKE_X: Self = Self(217);
    pub const NUNCHUK_SHAKE_Y: Self = Self(218);
    pub const NUNCHUK_SHAKE_Z: Self = Self(219);

    // Classic Controller
    pub const CLASSIC_BUTTON_A: Self = Self(300);
    pub const CLASSIC_STICK_LEFT: Self = Self(312);
    pub const CLASSIC_STICK_RIGHT: Self = Self(317);

    /// Virtual stick whose output is reinterpreted by an [`EmulationMode`]
    pub const STICK_EMULATION: Self = Self(600);

    /// The four tags following this one (up, down, left, right)
    pub const fn sequential_axes(self) -> [ControlId; 4] {
        [Self(self.0 + 1), Self(self.0 + 2), Self(self.0 + 3), Self(self.0 + 4)]
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pressed/released state delivered to the controller sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonState {
    Released,
    Pressed,
}

/// Which on-screen stick a joystick control drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StickControl {
    StickMain,
    StickC,
    NunchukStick,
    ClassicLeftStick,
    ClassicRightStick,
    /// Stick reinterpreted as a motion control
    StickEmulation,
}

impl StickControl {
    pub const fn id(self) -> ControlId {
        match self {
            Self::StickMain => ControlId::STICK_MAIN,
            Self::StickC => ControlId::STICK_C,
            Self::NunchukStick => ControlId::NUNCHUK_STICK,
            Self::ClassicLeftStick => ControlId::CLASSIC_STICK_LEFT,
            Self::ClassicRightStick => ControlId::CLASSIC_STICK_RIGHT,
            Self::StickEmulation => ControlId::STICK_EMULATION,
        }
    }
}

/// How a direct stick's deflection is reinterpreted as motion input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmulationMode {
    /// Plain stick, no reinterpretation
    #[default]
    Off,
    /// IR pointer; the boundary is widened to allow overscan
    WiimotePointing,
    WiimoteSwing,
    WiimoteTilt,
    WiimoteShakeX,
    NunchukSwing,
    NunchukTilt,
    NunchukShakeX,
}

impl EmulationMode {
    /// Every selectable mode, in menu order
    pub const ALL: [EmulationMode; 8] = [
        Self::Off,
        Self::WiimotePointing,
        Self::WiimoteSwing,
        Self::WiimoteTilt,
        Self::WiimoteShakeX,
        Self::NunchukSwing,
        Self::NunchukTilt,
        Self::NunchukShakeX,
    ];

    /// Tag of the motion control this mode drives (`ControlId(0)` when off)
    pub const fn id(self) -> ControlId {
        match self {
            Self::Off => ControlId(0),
            Self::WiimotePointing => ControlId::WIIMOTE_IR,
            Self::WiimoteSwing => ControlId::WIIMOTE_SWING,
            Self::WiimoteTilt => ControlId::WIIMOTE_TILT,
            Self::WiimoteShakeX => ControlId::WIIMOTE_SHAKE_X,
            Self::NunchukSwing => ControlId::NUNCHUK_SWING,
            Self::NunchukTilt => ControlId::NUNCHUK_TILT,
            Self::NunchukShakeX => ControlId::NUNCHUK_SHAKE_X,
        }
    }

    /// Look a mode up by its control tag.
    ///
    /// Unknown tags resolve to [`EmulationMode::Off`], which gives identity
    /// scale factors and sequential axis tags.
    pub fn from_id(id: ControlId) -> Self {
        Self::ALL.into_iter().find(|mode| mode.id() == id).unwrap_or_else(|| {
            tracing::warn!("Unknown emulation mode {}, falling back to off", id);
            Self::Off
        })
    }

    pub const fn is_shake(self) -> bool {
        matches!(self, Self::WiimoteShakeX | Self::NunchukShakeX)
    }

    /// Per-mode (y, x) multipliers applied to the raw stick deflection
    pub const fn scale_factors(self) -> [f32; 2] {
        match self {
            Self::WiimotePointing => [0.6, 0.4],
            Self::WiimoteSwing | Self::NunchukSwing => [-0.8, -0.8],
            Self::WiimoteTilt | Self::NunchukTilt => [0.8, 0.8],
            Self::Off | Self::WiimoteShakeX | Self::NunchukShakeX => [1.0, 1.0],
        }
    }

    /// Output slot tags for a stick driven in this mode
    ///
    /// Shake modes send both vertical slots to the X shake axis and the
    /// horizontal slots to Y and Z.
    pub const fn axis_ids(self) -> [ControlId; 4] {
        match self {
            Self::WiimoteShakeX => [
                ControlId::WIIMOTE_SHAKE_X,
                ControlId::WIIMOTE_SHAKE_X,
                ControlId::WIIMOTE_SHAKE_Y,
                ControlId::WIIMOTE_SHAKE_Z,
            ],
            Self::NunchukShakeX => [
                ControlId::NUNCHUK_SHAKE_X,
                ControlId::NUNCHUK_SHAKE_X,
                ControlId::NUNCHUK_SHAKE_Y,
                ControlId::NUNCHUK_SHAKE_Z,
            ],
            _ => self.id().sequential_axes(),
        }
    }
}

impl std::fmt::Display for EmulationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::WiimotePointing => "wiimote_pointing",
            Self::WiimoteSwing => "wiimote_swing",
            Self::WiimoteTilt => "wiimote_tilt",
            Self::WiimoteShakeX => "wiimote_shake_x",
            Self::NunchukSwing => "nunchuk_swing",
            Self::NunchukTilt => "nunchuk_tilt",
            Self::NunchukShakeX => "nunchuk_shake_x",
        };
        f.write_str(name)
    }
}

/// Button a pointer double-tap synthesizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleTapButton {
    #[default]
    A,
    B,
    Two,
    ClassicA,
}

impl DoubleTapButton {
    pub const ALL: [DoubleTapButton; 4] = [Self::A, Self::B, Self::Two, Self::ClassicA];

    pub const fn id(self) -> ControlId {
        match self {
            Self::A => ControlId::WIIMOTE_BUTTON_A,
            Self::B => ControlId::WIIMOTE_BUTTON_B,
            Self::Two => ControlId::WIIMOTE_BUTTON_2,
            Self::ClassicA => ControlId::CLASSIC_BUTTON_A,
        }
    }
}

impl std::fmt::Display for DoubleTapButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::A => "a",
            Self::B => "b",
            Self::Two => "two",
            Self::ClassicA => "classic_a",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor_table() {
        assert_eq!(EmulationMode::WiimotePointing.scale_factors(), [0.6, 0.4]);
        assert_eq!(EmulationMode::WiimoteSwing.scale_factors(), [-0.8, -0.8]);
        assert_eq!(EmulationMode::NunchukSwing.scale_factors(), [-0.8, -0.8]);
        assert_eq!(EmulationMode::WiimoteTilt.scale_factors(), [0.8, 0.8]);
        assert_eq!(EmulationMode::NunchukTilt.scale_factors(), [0.8, 0.8]);
        assert_eq!(EmulationMode::WiimoteShakeX.scale_factors(), [1.0, 1.0]);
        assert_eq!(EmulationMode::Off.scale_factors(), [1.0, 1.0]);
    }

    #[test]
    fn test_shake_axis_tags() {
        assert_eq!(
            EmulationMode::WiimoteShakeX.axis_ids(),
            [
                ControlId::WIIMOTE_SHAKE_X,
                ControlId::WIIMOTE_SHAKE_X,
                ControlId::WIIMOTE_SHAKE_Y,
                ControlId::WIIMOTE_SHAKE_Z
            ]
        );
        assert_eq!(EmulationMode::NunchukShakeX.axis_ids()[3], ControlId::NUNCHUK_SHAKE_Z);
    }

    #[test]
    fn test_sequential_axis_tags() {
        assert_eq!(
            EmulationMode::WiimoteTilt.axis_ids(),
            [ControlId(122), ControlId(123), ControlId(124), ControlId(125)]
        );
        assert_eq!(EmulationMode::Off.axis_ids(), [ControlId(1), ControlId(2), ControlId(3), ControlId(4)]);
    }

    #[test]
    fn test_unknown_mode_falls_back_to_off() {
        assert_eq!(EmulationMode::from_id(ControlId(9999)), EmulationMode::Off);
        assert_eq!(EmulationMode::from_id(ControlId::NUNCHUK_TILT), EmulationMode::NunchukTilt);
    }

    #[test]
    fn test_stick_tags_do_not_overlap() {
        let sticks = [
            StickControl::StickMain,
            StickControl::StickC,
            StickControl::NunchukStick,
            StickControl::ClassicLeftStick,
            StickControl::ClassicRightStick,
            StickControl::StickEmulation,
        ];
        for a in sticks {
            for b in sticks {
                if a != b {
                    assert!((a.id().0 - b.id().0).abs() >= 5, "{:?} overlaps {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_mode_names_roundtrip_through_yaml() {
        let mode: EmulationMode = serde_yaml::from_str("nunchuk_shake_x").unwrap();
        assert_eq!(mode, EmulationMode::NunchukShakeX);
        assert_eq!(mode.to_string(), "nunchuk_shake_x");
    }
}
