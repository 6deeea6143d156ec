use nalgebra_glm as glm;

use crate::camera::Camera;
use crate::error::{FrameFault, RtError};
use crate::gpu::{FRAME_IMAGE_UNIT, GpuBackend, ProgramHandle, TextureHandle, WORKGROUP_SIZE, uniform};
use crate::settings::SceneSettings;

/// The single RGBA8 texture the compute program writes and every consumer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTarget {
    pub texture: TextureHandle,
    pub width: u32,
    pub height: u32,
}

impl FrameTarget {
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Work groups needed for a `width` x `height` target.
///
/// Integer division: a dimension that is not a multiple of the work-group
/// size leaves its trailing pixels unwritten.
pub fn workgroups(width: u32, height: u32) -> (u32, u32) {
    (width / WORKGROUP_SIZE, height / WORKGROUP_SIZE)
}

/// Owns the frame target and the programs, and runs one compute dispatch
/// per frame followed by either a readback or a present.
///
/// There is a single target and no double buffering. Every dispatch ends
/// with a blocking barrier, so the target is always safe to read once
/// `dispatch_compute` returns.
pub struct FramePipeline<B: GpuBackend> {
    backend: B,
    compute: Option<ProgramHandle>,
    present: Option<ProgramHandle>,
    target: Option<FrameTarget>,
    scene: SceneSettings,
}

impl<B: GpuBackend> FramePipeline<B> {
    pub fn new(
        backend: B,
        compute: ProgramHandle,
        present: Option<ProgramHandle>,
        scene: SceneSettings,
    ) -> Self {
        Self {
            backend,
            compute: Some(compute),
            present,
            target: None,
            scene,
        }
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[allow(dead_code)]
    pub fn target(&self) -> Option<FrameTarget> {
        self.target
    }

    /// Allocate the frame target and bind it to image unit 0.
    ///
    /// Calling again with the same size keeps the current target; a new size
    /// replaces it.
    pub fn prepare_frame_target(&mut self, width: u32, height: u32) -> Result<FrameTarget, RtError> {
        if let Some(target) = self.target {
            if target.width == width && target.height == height {
                return Ok(target);
            }
            self.backend.delete_texture(target.texture);
            self.target = None;
        }

        if width % WORKGROUP_SIZE != 0 || height % WORKGROUP_SIZE != 0 {
            let (gx, gy) = workgroups(width, height);
            log::warn!(
                "Frame target {width}x{height} is not a multiple of {WORKGROUP_SIZE}; only {}x{} pixels will be written",
                gx * WORKGROUP_SIZE,
                gy * WORKGROUP_SIZE
            );
        }

        let texture = self
            .backend
            .create_texture(width, height)
            .map_err(|e| RtError::new("frame-target").with_arg("width", width).with_arg("height", height).push_rt(e))?;
        self.backend.bind_image_unit(FRAME_IMAGE_UNIT, texture);

        let target = FrameTarget {
            texture,
            width,
            height,
        };
        self.target = Some(target);
        log::debug!("Frame target ready: {width}x{height}");
        Ok(target)
    }

    /// Bind the camera and scene uniforms, dispatch over the whole target and
    /// wait on the image-access barrier.
    pub fn dispatch_compute(&mut self, camera: &Camera, projection: &glm::Mat4) -> Result<(), FrameFault> {
        let target = self.target.ok_or(FrameFault::NotPrepared)?;
        let program = self.compute.ok_or(FrameFault::NotPrepared)?;

        let position: [f32; 3] = camera.position().into();
        let view: [[f32; 4]; 4] = camera.view_matrix().into();
        let projection: [[f32; 4]; 4] = (*projection).into();

        self.backend.use_program(program);
        self.backend
            .set_uniform_vec3(program, uniform::CAMERA_POSITION, &position);
        self.backend
            .set_uniform_mat4(program, uniform::PROJECTION_MATRIX, &projection);
        self.backend
            .set_uniform_mat4(program, uniform::VIEW_MATRIX, &view);
        self.backend
            .set_uniform_vec3(program, uniform::SPHERE_CENTER, &self.scene.sphere_center);
        self.backend
            .set_uniform_f32(program, uniform::SPHERE_RADIUS, self.scene.sphere_radius);

        let (groups_x, groups_y) = workgroups(target.width, target.height);
        self.backend.dispatch_compute(groups_x, groups_y, 1);
        self.backend.memory_barrier();

        self.check("dispatch")
    }

    /// Read the whole target back as tightly packed RGBA8, row-major.
    pub fn capture_to_bytes(&mut self) -> Result<Vec<u8>, FrameFault> {
        let target = self.target.ok_or(FrameFault::NotPrepared)?;
        let mut pixels = vec![0u8; target.byte_len()];
        self.backend.read_texture(target.texture, &mut pixels);
        self.check("readback")?;
        Ok(pixels)
    }

    /// Draw the target over the default framebuffer.
    pub fn present_to_screen(&mut self) -> Result<(), FrameFault> {
        let target = self.target.ok_or(FrameFault::NotPrepared)?;
        let program = self.present.ok_or(FrameFault::NoPresentation)?;
        self.backend.draw_fullscreen(program, target.texture);
        self.check("present")
    }

    /// Delete the target and programs. Must run before the context goes away.
    pub fn release(&mut self) {
        if let Some(target) = self.target.take() {
            self.backend.delete_texture(target.texture);
        }
        if let Some(program) = self.compute.take() {
            self.backend.delete_program(program);
        }
        if let Some(program) = self.present.take() {
            self.backend.delete_program(program);
        }
    }

    fn check(&mut self, stage: &'static str) -> Result<(), FrameFault> {
        match self.backend.take_error() {
            Some(code) => Err(FrameFault::Gpu { code, stage }),
            None => Ok(()),
        }
    }
}
