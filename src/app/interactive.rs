use std::path::Path;

use nalgebra_glm as glm;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

use crate::camera::{Camera, CameraController, FRAME_STEP, perspective};
use crate::error::{FrameFault, RtError};
use crate::gpu::GpuBackend;
use crate::gpu::context::GlWindow;
use crate::gpu::gl::GlBackend;
use crate::input::InputState;
use crate::pipeline::FramePipeline;
use crate::settings::Settings;

pub struct EventResponse {
    pub exit: bool,
}

/// What a window event asks of the session beyond input and camera state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Continue,
    Exit,
    Resize(u32, u32),
}

/// Fold a window event into held keys and the camera controller.
pub fn apply_event(
    controller: &mut CameraController,
    input: &mut InputState,
    event: &WindowEvent,
) -> EventAction {
    match event {
        WindowEvent::CloseRequested => return EventAction::Exit,
        WindowEvent::KeyboardInput { event, .. } => {
            return apply_key(controller, input, event.physical_key, event.state, event.repeat);
        }
        WindowEvent::CursorMoved { position, .. } => {
            controller.on_mouse_move((position.x, position.y));
        }
        WindowEvent::CursorLeft { .. } => controller.forget_cursor(),
        WindowEvent::Focused(false) => {
            input.clear();
            controller.forget_cursor();
        }
        WindowEvent::Resized(size) => return EventAction::Resize(size.width, size.height),
        _ => {}
    }
    EventAction::Continue
}

/// Esc exits, R resets the camera, everything else updates held keys.
pub fn apply_key(
    controller: &mut CameraController,
    input: &mut InputState,
    key: PhysicalKey,
    state: ElementState,
    repeat: bool,
) -> EventAction {
    let pressed = state == ElementState::Pressed;
    match key {
        PhysicalKey::Code(KeyCode::Escape) if pressed => return EventAction::Exit,
        PhysicalKey::Code(KeyCode::KeyR) if pressed && !repeat => controller.reset(),
        _ => {}
    }
    input.apply_key(key, state);
    EventAction::Continue
}

/// One interactive frame short of the swap: move by held keys, dispatch,
/// then draw the target. A fault stops the frame where it happened.
pub fn step<B: GpuBackend>(
    pipeline: &mut FramePipeline<B>,
    controller: &mut CameraController,
    input: &InputState,
    projection: &glm::Mat4,
) -> Result<(), FrameFault> {
    controller.apply_movement(input, FRAME_STEP);
    pipeline.dispatch_compute(controller.camera(), projection)?;
    pipeline.present_to_screen()
}

/// Live window session: input, camera, and the per-frame
/// dispatch -> present -> swap sequence.
pub struct InteractiveSession {
    // Declared before `gl_window` so GL objects are dropped while the context lives.
    pipeline: FramePipeline<GlBackend>,
    controller: CameraController,
    input: InputState,
    projection: glm::Mat4,
    skipped_frames: u64,
    gl_window: GlWindow,
}

impl InteractiveSession {
    pub fn new(event_loop: &ActiveEventLoop, settings: &Settings) -> Result<Self, RtError> {
        let window_settings = &settings.window;
        let (width, height) = (window_settings.width, window_settings.height);
        let attributes = Window::default_attributes()
            .with_title(window_settings.title.as_str())
            .with_inner_size(PhysicalSize::new(width, height));
        let (gl_window, gl) = GlWindow::new(event_loop, attributes, window_settings.vsync)?;

        let mut backend = GlBackend::new(gl)?;
        let shaders = &settings.shaders;
        let compute = backend.compile_compute(Path::new(&shaders.compute))?;
        let present = match backend.compile_present(
            Path::new(&shaders.present_vertex),
            Path::new(&shaders.present_fragment),
        ) {
            Ok(program) => program,
            Err(e) => {
                backend.delete_program(compute);
                return Err(e);
            }
        };

        let size = gl_window.window.inner_size();
        backend.set_viewport(size.width, size.height);

        let mut pipeline = FramePipeline::new(backend, compute, Some(present), settings.scene);
        if let Err(e) = pipeline.prepare_frame_target(width, height) {
            pipeline.release();
            return Err(e);
        }

        log::info!("Interactive session started: {width}x{height}, WASD to move, R to reset, Esc to quit");

        Ok(Self {
            pipeline,
            controller: CameraController::new(Camera::new(), settings.controls.mouse_sensitivity),
            input: InputState::new(),
            projection: perspective(&settings.projection, width, height),
            skipped_frames: 0,
            gl_window,
        })
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        match apply_event(&mut self.controller, &mut self.input, event) {
            EventAction::Exit => return EventResponse { exit: true },
            EventAction::Resize(width, height) => {
                self.gl_window.resize(width, height);
                self.pipeline.backend_mut().set_viewport(width, height);
            }
            EventAction::Continue => {}
        }
        EventResponse { exit: false }
    }

    /// Render, present and swap. A faulty frame is logged and not swapped.
    pub fn frame(&mut self) {
        let rendered = step(&mut self.pipeline, &mut self.controller, &self.input, &self.projection);
        if let Err(fault) = rendered {
            self.skipped_frames += 1;
            log::warn!("Skipping frame ({} so far): {fault}", self.skipped_frames);
            return;
        }

        if let Err(e) = self.gl_window.swap_buffers() {
            log::error!("Swap failed: {e}");
        }
    }

    pub fn release(&mut self) {
        self.pipeline.release();
        if self.skipped_frames > 0 {
            log::info!("Session ended with {} skipped frame(s)", self.skipped_frames);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::ProgramHandle;
    use crate::gpu::fake::{Call, FakeBackend, UniformValue};
    use crate::gpu::uniform;
    use crate::settings::{ProjectionSettings, SceneSettings};

    struct Parts {
        pipeline: FramePipeline<FakeBackend>,
        compute: ProgramHandle,
        present: ProgramHandle,
        controller: CameraController,
        input: InputState,
        projection: glm::Mat4,
    }

    fn parts() -> Parts {
        let mut backend = FakeBackend::new();
        let compute = backend.create_program();
        let present = backend.create_program();
        let mut pipeline = FramePipeline::new(backend, compute, Some(present), SceneSettings::default());
        pipeline.prepare_frame_target(32, 32).unwrap();
        Parts {
            pipeline,
            compute,
            present,
            controller: CameraController::new(Camera::new(), 0.1),
            input: InputState::new(),
            projection: perspective(&ProjectionSettings::default(), 32, 32),
        }
    }

    fn press(p: &mut Parts, code: KeyCode) -> EventAction {
        apply_key(&mut p.controller, &mut p.input, PhysicalKey::Code(code), ElementState::Pressed, false)
    }

    #[test]
    fn held_forward_key_moves_camera_before_dispatch() {
        let mut p = parts();
        let start = p.controller.camera().position();
        press(&mut p, KeyCode::KeyW);

        step(&mut p.pipeline, &mut p.controller, &p.input, &p.projection).unwrap();

        let moved = p.controller.camera().position();
        assert!((start - moved).norm() > 0.04);
        let backend = p.pipeline.backend_mut();
        assert_eq!(
            backend.uniforms.get(&(p.compute, uniform::CAMERA_POSITION.to_string())),
            Some(&UniformValue::Vec3(moved.into()))
        );
        let bound = backend
            .position_of(&Call::Uniform {
                program: p.compute,
                name: uniform::CAMERA_POSITION.to_string(),
            })
            .unwrap();
        let dispatched = backend.position_of(&Call::Dispatch(2, 2, 1)).unwrap();
        assert!(bound < dispatched);
    }

    #[test]
    fn idle_frame_keeps_camera_still() {
        let mut p = parts();
        let start = p.controller.camera().position();
        step(&mut p.pipeline, &mut p.controller, &p.input, &p.projection).unwrap();
        assert_eq!(p.controller.camera().position(), start);
    }

    #[test]
    fn present_follows_barrier() {
        let mut p = parts();
        step(&mut p.pipeline, &mut p.controller, &p.input, &p.projection).unwrap();

        let texture = p.pipeline.target().unwrap().texture;
        let backend = p.pipeline.backend_mut();
        let barrier = backend.position_of(&Call::Barrier).unwrap();
        let drawn = backend
            .position_of(&Call::DrawFullscreen {
                program: p.present,
                texture,
            })
            .unwrap();
        assert!(barrier < drawn);
    }

    #[test]
    fn gpu_error_stops_frame_before_present() {
        let mut p = parts();
        p.pipeline.backend_mut().inject_error = Some(glow::OUT_OF_MEMORY);

        let result = step(&mut p.pipeline, &mut p.controller, &p.input, &p.projection);

        assert_eq!(
            result,
            Err(FrameFault::Gpu {
                code: glow::OUT_OF_MEMORY,
                stage: "dispatch"
            })
        );
        let backend = p.pipeline.backend_mut();
        assert!(
            !backend
                .calls
                .iter()
                .any(|c| matches!(c, Call::DrawFullscreen { .. }))
        );
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut p = parts();
        press(&mut p, KeyCode::KeyW);
        press(&mut p, KeyCode::KeyD);

        let action = apply_event(&mut p.controller, &mut p.input, &WindowEvent::Focused(false));

        assert_eq!(action, EventAction::Continue);
        assert!(!p.input.key_down(KeyCode::KeyW));
        assert!(!p.input.key_down(KeyCode::KeyD));
        let start = p.controller.camera().position();
        step(&mut p.pipeline, &mut p.controller, &p.input, &p.projection).unwrap();
        assert_eq!(p.controller.camera().position(), start);
    }

    #[test]
    fn escape_and_close_request_end_the_loop() {
        let mut p = parts();
        assert_eq!(press(&mut p, KeyCode::Escape), EventAction::Exit);
        assert_eq!(
            apply_event(&mut p.controller, &mut p.input, &WindowEvent::CloseRequested),
            EventAction::Exit
        );
        let released = apply_key(
            &mut p.controller,
            &mut p.input,
            PhysicalKey::Code(KeyCode::Escape),
            ElementState::Released,
            false,
        );
        assert_eq!(released, EventAction::Continue);
    }

    #[test]
    fn r_resets_camera_once_per_press() {
        let mut p = parts();
        press(&mut p, KeyCode::KeyW);
        for _ in 0..10 {
            step(&mut p.pipeline, &mut p.controller, &p.input, &p.projection).unwrap();
        }
        let moved = p.controller.camera().position();

        let repeated = apply_key(
            &mut p.controller,
            &mut p.input,
            PhysicalKey::Code(KeyCode::KeyR),
            ElementState::Pressed,
            true,
        );
        assert_eq!(repeated, EventAction::Continue);
        assert_eq!(p.controller.camera().position(), moved);

        press(&mut p, KeyCode::KeyR);
        assert_eq!(p.controller.camera().position(), Camera::new().position());
    }

    #[test]
    fn resize_is_handed_back_to_the_session() {
        let mut p = parts();
        let event = WindowEvent::Resized(PhysicalSize::new(800, 600));
        assert_eq!(
            apply_event(&mut p.controller, &mut p.input, &event),
            EventAction::Resize(800, 600)
        );
    }
}
