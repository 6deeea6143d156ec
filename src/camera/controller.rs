use winit::keyboard::KeyCode;

use super::Camera;
use crate::input::InputState;

/// Translation applied per frame for each held movement key.
///
/// Movement is per frame, not per second, so speed follows the frame rate.
pub const FRAME_STEP: f32 = 0.05;

/// Maps cursor motion and held keys onto the camera.
pub struct CameraController {
    camera: Camera,
    sensitivity: f32,
    last_mouse_pos: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new(camera: Camera, sensitivity: f32) -> Self {
        Self {
            camera,
            sensitivity,
            last_mouse_pos: None,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Rotate by the cursor delta since the previous sample.
    ///
    /// The first sample after construction or `forget_cursor` only records
    /// the position. Returns whether the camera rotated.
    pub fn on_mouse_move(&mut self, position: (f64, f64)) -> bool {
        let handled = match self.last_mouse_pos {
            Some(last) => {
                let delta_x = (position.0 - last.0) as f32;
                let delta_y = (position.1 - last.1) as f32;
                // Screen y grows downwards.
                self.camera
                    .rotate(delta_x * self.sensitivity, -delta_y * self.sensitivity, 0.0);
                true
            }
            None => false,
        };
        self.last_mouse_pos = Some(position);
        handled
    }

    /// Drop the cursor baseline, e.g. when the cursor leaves the window.
    pub fn forget_cursor(&mut self) {
        self.last_mouse_pos = None;
    }

    /// Translate the camera for every held WASD key.
    pub fn apply_movement(&mut self, input: &InputState, dt: f32) {
        if input.key_down(KeyCode::KeyW) {
            self.camera.move_forward(dt);
        }
        if input.key_down(KeyCode::KeyS) {
            self.camera.move_backward(dt);
        }
        if input.key_down(KeyCode::KeyA) {
            self.camera.move_left(dt);
        }
        if input.key_down(KeyCode::KeyD) {
            self.camera.move_right(dt);
        }
    }

    pub fn reset(&mut self) {
        self.camera.reset();
        self.last_mouse_pos = None;
    }
}
