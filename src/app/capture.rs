use std::path::Path;
use std::time::Instant;

use nalgebra_glm as glm;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::camera::{Camera, perspective};
use crate::error::RtError;
use crate::gpu::GpuBackend;
use crate::gpu::context::GlWindow;
use crate::gpu::gl::GlBackend;
use crate::image_out::write_png;
use crate::pipeline::FramePipeline;
use crate::settings::{CaptureSettings, Settings};

/// Camera posed as configured for headless capture.
pub fn capture_camera(settings: &CaptureSettings) -> Camera {
    let mut camera = Camera::new();
    camera.set_position(glm::Vec3::from(settings.camera_position));
    camera.set_rotation(settings.camera_yaw, settings.camera_pitch, settings.camera_roll);
    camera
}

/// Headless capture on a hidden window's GL context.
pub fn run(event_loop: &ActiveEventLoop, settings: &Settings, output: &Path) -> Result<(), RtError> {
    // The window only hosts the context; the frame target carries the resolution.
    let attributes = Window::default_attributes()
        .with_title(settings.window.title.as_str())
        .with_visible(false)
        .with_inner_size(PhysicalSize::new(64, 64));
    let (gl_window, gl) = GlWindow::new(event_loop, attributes, false)?;

    let mut backend = GlBackend::new(gl)?;
    let compute = backend.compile_compute(Path::new(&settings.shaders.compute))?;
    let mut pipeline = FramePipeline::new(backend, compute, None, settings.scene);

    let result = capture_frame(&mut pipeline, settings, output);
    pipeline.release();

    drop(pipeline);
    drop(gl_window);
    result.map(|_| ())
}

/// Render one frame with the capture pose and write it to `output`.
///
/// Returns whether a file was written. A faulty frame or a failed encode is
/// logged and reported as `Ok(false)`; only target allocation is fatal.
pub fn capture_frame<B: GpuBackend>(
    pipeline: &mut FramePipeline<B>,
    settings: &Settings,
    output: &Path,
) -> Result<bool, RtError> {
    let capture = &settings.capture;
    pipeline.prepare_frame_target(capture.width, capture.height)?;

    let camera = capture_camera(capture);
    let projection = perspective(&settings.projection, capture.width, capture.height);

    let started = Instant::now();
    if let Err(fault) = pipeline.dispatch_compute(&camera, &projection) {
        log::error!("Frame skipped, nothing written: {fault}");
        return Ok(false);
    }
    log::info!("Ray tracing time: {:.3} seconds", started.elapsed().as_secs_f64());

    let started = Instant::now();
    let pixels = match pipeline.capture_to_bytes() {
        Ok(pixels) => pixels,
        Err(fault) => {
            log::error!("Readback failed, nothing written: {fault}");
            return Ok(false);
        }
    };

    let written = match write_png(output, &pixels, capture.width, capture.height) {
        Ok(()) => {
            log::info!("Wrote to {}", output.display());
            true
        }
        Err(e) => {
            log::error!("{e:#}");
            false
        }
    };
    log::info!("Image write time: {:.3} seconds", started.elapsed().as_secs_f64());

    Ok(written)
}
