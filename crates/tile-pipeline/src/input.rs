//! Pointer and wheel input.
//!
//! Panning is a two-state machine (idle, panning). Wheel events bypass it
//! and step the zoom around the current offset, not around the cursor.

use serde::{Deserialize, Serialize};

use crate::viewport::{ViewportTransform, ZoomDirection};

/// Host input event, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    /// Release anywhere, including outside the surface.
    PointerUp,
    Wheel { delta_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanState {
    #[default]
    Idle,
    Panning { last_x: f64, last_y: f64 },
}

/// Translates input events into transform updates.
#[derive(Debug, Clone, Default)]
pub struct PanZoomController {
    state: PanState,
}

impl PanZoomController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PanState {
        self.state
    }

    /// Apply `event` to `transform`. Returns true when the transform changed.
    pub fn handle(&mut self, event: InputEvent, transform: &mut ViewportTransform) -> bool {
        match (event, self.state) {
            (InputEvent::PointerDown { x, y }, _) => {
                self.state = PanState::Panning { last_x: x, last_y: y };
                false
            }
            (InputEvent::PointerMove { x, y }, PanState::Panning { last_x, last_y }) => {
                self.state = PanState::Panning { last_x: x, last_y: y };
                let (dx, dy) = (x - last_x, y - last_y);
                if dx == 0.0 && dy == 0.0 {
                    return false;
                }
                transform.pan_by(dx, dy);
                true
            }
            (InputEvent::PointerMove { .. }, PanState::Idle) => false,
            (InputEvent::PointerUp, _) => {
                self.state = PanState::Idle;
                false
            }
            (InputEvent::Wheel { delta_y }, _) => {
                transform.zoom_step(ZoomDirection::from_wheel_delta(delta_y))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{MAX_ZOOM, MIN_ZOOM};
    use test_utils::assert_approx_eq;

    #[test]
    fn test_pan_gesture() {
        let mut controller = PanZoomController::new();
        let mut transform = ViewportTransform::default();

        assert!(!controller.handle(InputEvent::PointerDown { x: 100.0, y: 100.0 }, &mut transform));
        assert!(controller.handle(InputEvent::PointerMove { x: 130.0, y: 115.0 }, &mut transform));
        assert_approx_eq!(transform.offset_x, 30.0, 1e-9);
        assert_approx_eq!(transform.offset_y, 15.0, 1e-9);

        assert!(!controller.handle(InputEvent::PointerUp, &mut transform));
        assert_eq!(controller.state(), PanState::Idle);
        assert_approx_eq!(transform.offset_x, 30.0, 1e-9);
        assert_approx_eq!(transform.offset_y, 15.0, 1e-9);
    }

    #[test]
    fn test_moves_accumulate_incrementally() {
        let mut controller = PanZoomController::new();
        let mut transform = ViewportTransform::default();

        controller.handle(InputEvent::PointerDown { x: 0.0, y: 0.0 }, &mut transform);
        controller.handle(InputEvent::PointerMove { x: 10.0, y: 0.0 }, &mut transform);
        controller.handle(InputEvent::PointerMove { x: 15.0, y: -5.0 }, &mut transform);
        assert_approx_eq!(transform.offset_x, 15.0, 1e-9);
        assert_approx_eq!(transform.offset_y, -5.0, 1e-9);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut controller = PanZoomController::new();
        let mut transform = ViewportTransform::default();

        assert!(!controller.handle(InputEvent::PointerMove { x: 50.0, y: 50.0 }, &mut transform));
        assert_eq!(transform, ViewportTransform::default());
    }

    #[test]
    fn test_wheel_ignores_pan_state() {
        let mut controller = PanZoomController::new();
        let mut transform = ViewportTransform::default();

        controller.handle(InputEvent::PointerDown { x: 5.0, y: 5.0 }, &mut transform);
        assert!(controller.handle(InputEvent::Wheel { delta_y: -1.0 }, &mut transform));
        assert_approx_eq!(transform.zoom, 1.1, 1e-9);
        assert!(matches!(controller.state(), PanState::Panning { .. }));

        assert!(controller.handle(InputEvent::Wheel { delta_y: 3.0 }, &mut transform));
        assert_approx_eq!(transform.zoom, 0.99, 1e-9);
        // Not cursor-anchored
        assert_approx_eq!(transform.offset_x, 0.0, 1e-9);
    }

    #[test]
    fn test_wheel_at_bound_reports_no_change() {
        let mut controller = PanZoomController::new();
        let mut transform = ViewportTransform::new(MAX_ZOOM, 0.0, 0.0);
        assert!(!controller.handle(InputEvent::Wheel { delta_y: -1.0 }, &mut transform));

        let mut transform = ViewportTransform::new(MIN_ZOOM, 0.0, 0.0);
        assert!(!controller.handle(InputEvent::Wheel { delta_y: 1.0 }, &mut transform));
    }
}
