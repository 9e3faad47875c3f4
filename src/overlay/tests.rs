//! Tests for the Overlay dispatcher

use super::*;
use crate::config::{AppConfig, BoundaryConfig, JoystickConfig, OverlayConfig, PointerConfig};
use crate::controls::{ButtonState, DoubleTapButton, EmulationMode, StickControl};
use crate::geometry::Rect;
use crate::sink::RecordingSink;
use crate::touch::ActivePointers;

fn make_test_config() -> AppConfig {
    AppConfig {
        overlay: OverlayConfig {
            opacity: 200,
            relative_center: false,
            game_aspect_ratio: 2.0,
            boundary: BoundaryConfig::Circle { radius: 1.0 },
        },
        joysticks: vec![
            JoystickConfig {
                control: StickControl::StickMain,
                emulation: EmulationMode::Off,
                outer: Rect::new(0, 600, 200, 800),
                inner: Rect::new(70, 670, 130, 730),
            },
            JoystickConfig {
                control: StickControl::StickEmulation,
                emulation: EmulationMode::WiimoteTilt,
                outer: Rect::new(800, 600, 1000, 800),
                inner: Rect::new(870, 670, 930, 730),
            },
        ],
        pointer: Some(PointerConfig {
            surface: Rect::new(0, 0, 1000, 500),
            double_tap: DoubleTapButton::B,
        }),
    }
}

#[test]
fn test_from_config_builds_controls() {
    let overlay = Overlay::from_config(&make_test_config());

    assert_eq!(overlay.joysticks().len(), 2);
    assert_eq!(overlay.joysticks()[0].control(), ControlId::STICK_MAIN);
    assert_eq!(overlay.joysticks()[1].axis_ids(), ControlId::WIIMOTE_TILT.sequential_axes());
    assert_eq!(overlay.pointer().unwrap().double_tap_button(), ControlId::WIIMOTE_BUTTON_B);
    // Opacity is pushed into every joystick
    assert!(overlay.visuals().iter().all(|v| v.outer.alpha == 200));
}

#[test]
fn test_joystick_press_emits_its_axes() {
    let mut overlay = Overlay::from_config(&make_test_config());
    let mut sink = RecordingSink::new();
    let mut active = ActivePointers::new();

    // Right half of the main stick
    assert!(overlay.handle_touch(&active.press(PointerId(0), 150.0, 700.0), 0, &mut sink));

    let [up, down, left, right] = ControlId::STICK_MAIN.sequential_axes();
    assert_eq!(sink.last_axis(up), Some(0.0));
    assert_eq!(sink.last_axis(down), Some(0.0));
    assert_eq!(sink.last_axis(left), Some(0.0));
    assert_eq!(sink.last_axis(right), Some(0.5));

    // Finger held by the joystick never reaches the pointer
    assert!(overlay.pointer().unwrap().track_id().is_none());
    assert!(!overlay.pointer().unwrap().is_double_tap_armed());
    assert!(overlay.is_touch_consumed(PointerId(0)));
}

#[test]
fn test_release_emits_neutral_axes() {
    let mut overlay = Overlay::from_config(&make_test_config());
    let mut sink = RecordingSink::new();
    let mut active = ActivePointers::new();

    overlay.handle_touch(&active.press(PointerId(0), 150.0, 650.0), 0, &mut sink);
    overlay.handle_touch(&active.release(PointerId(0)).unwrap(), 20, &mut sink);

    for id in ControlId::STICK_MAIN.sequential_axes() {
        assert_eq!(sink.last_axis(id), Some(0.0));
    }
    assert!(!overlay.is_touch_consumed(PointerId(0)));
}

#[test]
fn test_emulation_stick_reports_every_move() {
    let mut overlay = Overlay::from_config(&make_test_config());
    let mut sink = RecordingSink::new();
    let mut active = ActivePointers::new();

    // Finger on the pointer surface, nowhere near the tilt stick
    overlay.handle_touch(&active.press(PointerId(1), 500.0, 250.0), 0, &mut sink);
    sink.take();
    overlay.handle_touch(&active.move_to(PointerId(1), 510.0, 250.0), 10, &mut sink);

    let tilt_up = ControlId::WIIMOTE_TILT.sequential_axes()[0];
    assert_eq!(sink.last_axis(tilt_up), Some(0.0));
}

#[test]
fn test_pointer_axes_and_double_tap_through_overlay() {
    let mut overlay = Overlay::from_config(&make_test_config());
    let mut sink = RecordingSink::new();
    let mut active = ActivePointers::new();

    // Game is 2:1 on a 2:1 surface, no bars
    overlay.handle_touch(&active.press(PointerId(4), 750.0, 125.0), 0, &mut sink);
    let [ir_up, _, _, ir_right] = ControlId::WIIMOTE_IR.sequential_axes();
    assert_eq!(sink.last_axis(ir_up), Some(-0.5));
    assert_eq!(sink.last_axis(ir_right), Some(0.5));

    overlay.handle_touch(&active.release(PointerId(4)).unwrap(), 40, &mut sink);
    overlay.handle_touch(&active.press(PointerId(5), 750.0, 125.0), 120, &mut sink);
    assert_eq!(overlay.next_deadline(), Some(170));

    overlay.advance(170, &mut sink);
    assert_eq!(
        sink.buttons(),
        vec![
            (ControlId::WIIMOTE_BUTTON_B, ButtonState::Pressed),
            (ControlId::WIIMOTE_BUTTON_B, ButtonState::Released),
        ]
    );
}

#[test]
fn test_relative_center_setting_applies_live() {
    let mut overlay = Overlay::from_config(&make_test_config());
    let mut sink = RecordingSink::new();
    overlay.apply_settings(OverlaySettings {
        relative_center: true,
        opacity: 100,
    });

    let mut active = ActivePointers::new();
    overlay.handle_touch(&active.press(PointerId(0), 20.0, 620.0), 0, &mut sink);

    let joystick = &overlay.joysticks()[0];
    let virt = joystick.virtual_bounds();
    assert_eq!((virt.center_x(), virt.center_y()), (20, 620));
    assert_eq!(joystick.raw_axes(), [0.0, 0.0]);
    assert_eq!(overlay.visuals()[0].bounds_box.alpha, 100);
}

#[test]
fn test_layout_edit_drags_control() {
    let mut overlay = Overlay::from_config(&make_test_config());
    let mut sink = RecordingSink::new();
    overlay.set_mode(OverlayMode::LayoutEdit);

    let mut active = ActivePointers::new();
    assert!(overlay.handle_touch(&active.press(PointerId(0), 900.0, 700.0), 0, &mut sink));
    assert!(overlay.handle_touch(&active.move_to(PointerId(0), 880.0, 650.0), 10, &mut sink));
    assert!(overlay.handle_touch(&active.release(PointerId(0)).unwrap(), 20, &mut sink));

    assert_eq!(overlay.joysticks()[1].original_bounds(), Rect::new(780, 550, 980, 750));
    assert_eq!(overlay.joysticks()[0].original_bounds(), Rect::new(0, 600, 200, 800));
    // Nothing reaches the sink while editing
    assert!(sink.events.is_empty());
}

#[test]
fn test_layout_edit_miss_drags_nothing() {
    let mut overlay = Overlay::from_config(&make_test_config());
    let mut sink = RecordingSink::new();
    overlay.set_mode(OverlayMode::LayoutEdit);

    let mut active = ActivePointers::new();
    assert!(!overlay.handle_touch(&active.press(PointerId(0), 500.0, 100.0), 0, &mut sink));
    assert!(!overlay.handle_touch(&active.move_to(PointerId(0), 600.0, 100.0), 10, &mut sink));
    assert_eq!(overlay.joysticks()[0].bounds(), Rect::new(0, 600, 200, 800));
}

#[test]
fn test_shutdown_drops_pending_release() {
    let mut overlay = Overlay::from_config(&make_test_config());
    let mut sink = RecordingSink::new();
    let mut active = ActivePointers::new();

    overlay.handle_touch(&active.press(PointerId(0), 500.0, 250.0), 0, &mut sink);
    overlay.handle_touch(&active.release(PointerId(0)).unwrap(), 10, &mut sink);
    overlay.handle_touch(&active.press(PointerId(0), 500.0, 250.0), 50, &mut sink);
    overlay.shutdown();

    assert_eq!(overlay.next_deadline(), None);
    assert_eq!(overlay.advance(1_000, &mut sink), 0);
    assert_eq!(sink.buttons(), vec![(ControlId::WIIMOTE_BUTTON_B, ButtonState::Pressed)]);
}
