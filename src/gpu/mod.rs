//! GPU resource handles and the backend seam used by the frame pipeline.

pub mod context;
pub mod gl;
pub mod shader;

#[cfg(test)]
pub mod fake;

use crate::error::RtError;

/// Opaque texture handle issued by a [`GpuBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

/// Opaque linked-program handle issued by a [`GpuBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub(crate) u32);

/// Image unit the compute program writes its output to.
pub const FRAME_IMAGE_UNIT: u32 = 0;

/// Work-group edge length of the compute program (`local_size_x/y`).
pub const WORKGROUP_SIZE: u32 = 16;

/// Names of the uniforms the compute program reads. Unknown names are
/// silently ignored by the driver, so these must match the GLSL source.
pub mod uniform {
    pub const CAMERA_POSITION: &str = "camera_position";
    pub const PROJECTION_MATRIX: &str = "projection_matrix";
    pub const VIEW_MATRIX: &str = "view_matrix";
    pub const SPHERE_CENTER: &str = "sphere_center";
    pub const SPHERE_RADIUS: &str = "sphere_radius";
}

/// Minimal set of GPU operations the frame pipeline needs.
///
/// All calls happen on the thread that owns the graphics context.
pub trait GpuBackend {
    /// Allocate a zero-filled RGBA8 texture.
    fn create_texture(&mut self, width: u32, height: u32) -> Result<TextureHandle, RtError>;
    fn delete_texture(&mut self, texture: TextureHandle);
    fn bind_image_unit(&mut self, unit: u32, texture: TextureHandle);

    fn use_program(&mut self, program: ProgramHandle);
    fn delete_program(&mut self, program: ProgramHandle);
    fn set_uniform_vec3(&mut self, program: ProgramHandle, name: &str, value: &[f32; 3]);
    /// `value` is column-major.
    fn set_uniform_mat4(&mut self, program: ProgramHandle, name: &str, value: &[[f32; 4]; 4]);
    fn set_uniform_f32(&mut self, program: ProgramHandle, name: &str, value: f32);

    fn dispatch_compute(&mut self, groups_x: u32, groups_y: u32, groups_z: u32);
    /// Block until image writes of prior dispatches are visible to reads.
    fn memory_barrier(&mut self);

    /// Copy the texture into `out` as tightly packed RGBA8 rows.
    fn read_texture(&mut self, texture: TextureHandle, out: &mut [u8]);
    /// Draw `texture` over the whole default framebuffer.
    fn draw_fullscreen(&mut self, program: ProgramHandle, texture: TextureHandle);
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Drain the backend error flag. `None` means no error was raised.
    fn take_error(&mut self) -> Option<u32>;
}
