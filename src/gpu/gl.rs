use std::num::NonZeroU32;

use glow::HasContext;

use super::{GpuBackend, ProgramHandle, TextureHandle};
use crate::error::RtError;

const MAX_DRAINED_ERRORS: usize = 16;

/// OpenGL 4.3 backend on top of `glow`.
///
/// Must only be used while its context is current on the calling thread.
pub struct GlBackend {
    pub(crate) gl: glow::Context,
    fullscreen_vao: glow::NativeVertexArray,
}

impl GlBackend {
    pub fn new(gl: glow::Context) -> Result<Self, RtError> {
        unsafe {
            log::info!(
                "GL {} on {} ({})",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER),
                gl.get_parameter_string(glow::VENDOR),
            );

            // Core profile refuses draws without a bound vertex array, even an empty one.
            let fullscreen_vao = gl
                .create_vertex_array()
                .map_err(|msg| RtError::new("gl-vertex-array").with_arg("msg", msg))?;

            Ok(Self { gl, fullscreen_vao })
        }
    }

    pub(crate) fn native_program(program: ProgramHandle) -> Option<glow::NativeProgram> {
        NonZeroU32::new(program.0).map(glow::NativeProgram)
    }

    pub(crate) fn program_handle(program: glow::NativeProgram) -> ProgramHandle {
        ProgramHandle(program.0.get())
    }

    fn native_texture(texture: TextureHandle) -> Option<glow::NativeTexture> {
        NonZeroU32::new(texture.0).map(glow::NativeTexture)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<glow::NativeUniformLocation> {
        let program = Self::native_program(program)?;
        let location = unsafe { self.gl.get_uniform_location(program, name) };
        if location.is_none() {
            log::trace!("uniform {name} is not active in program {}", program.0);
        }
        location
    }
}

impl GpuBackend for GlBackend {
    fn create_texture(&mut self, width: u32, height: u32) -> Result<TextureHandle, RtError> {
        let zeros = vec![0u8; width as usize * height as usize * 4];
        unsafe {
            let texture = self
                .gl
                .create_texture()
                .map_err(|msg| RtError::new("gl-texture").with_arg("msg", msg))?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(zeros.as_slice())),
            );
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            self.gl.bind_texture(glow::TEXTURE_2D, None);

            if let Some(code) = self.take_error() {
                self.gl.delete_texture(texture);
                return Err(RtError::new("gl-texture-storage")
                    .with_arg("width", width)
                    .with_arg("height", height)
                    .with_arg("code", format!("0x{code:04x}")));
            }

            Ok(TextureHandle(texture.0.get()))
        }
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if let Some(texture) = Self::native_texture(texture) {
            unsafe { self.gl.delete_texture(texture) };
        }
    }

    fn bind_image_unit(&mut self, unit: u32, texture: TextureHandle) {
        unsafe {
            self.gl.bind_image_texture(
                unit,
                Self::native_texture(texture),
                0,
                false,
                0,
                glow::WRITE_ONLY,
                glow::RGBA8,
            );
        }
    }

    fn use_program(&mut self, program: ProgramHandle) {
        unsafe { self.gl.use_program(Self::native_program(program)) };
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if let Some(program) = Self::native_program(program) {
            unsafe { self.gl.delete_program(program) };
        }
    }

    fn set_uniform_vec3(&mut self, program: ProgramHandle, name: &str, value: &[f32; 3]) {
        let location = self.uniform_location(program, name);
        unsafe { self.gl.uniform_3_f32_slice(location.as_ref(), value) };
    }

    fn set_uniform_mat4(&mut self, program: ProgramHandle, name: &str, value: &[[f32; 4]; 4]) {
        let location = self.uniform_location(program, name);
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(location.as_ref(), false, bytemuck::cast_slice(value))
        };
    }

    fn set_uniform_f32(&mut self, program: ProgramHandle, name: &str, value: f32) {
        let location = self.uniform_location(program, name);
        unsafe { self.gl.uniform_1_f32(location.as_ref(), value) };
    }

    fn dispatch_compute(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) {
        unsafe { self.gl.dispatch_compute(groups_x, groups_y, groups_z) };
    }

    fn memory_barrier(&mut self) {
        unsafe {
            self.gl.memory_barrier(
                glow::SHADER_IMAGE_ACCESS_BARRIER_BIT
                    | glow::TEXTURE_FETCH_BARRIER_BIT
                    | glow::TEXTURE_UPDATE_BARRIER_BIT,
            );
            // glMemoryBarrier only orders commands; finish makes it a host sync point.
            self.gl.finish();
        }
    }

    fn read_texture(&mut self, texture: TextureHandle, out: &mut [u8]) {
        unsafe {
            self.gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            self.gl
                .bind_texture(glow::TEXTURE_2D, Self::native_texture(texture));
            self.gl.get_tex_image(
                glow::TEXTURE_2D,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(Some(out)),
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn draw_fullscreen(&mut self, program: ProgramHandle, texture: TextureHandle) {
        let sampler = self.uniform_location(program, "frame");
        unsafe {
            self.gl.disable(glow::DEPTH_TEST);
            self.gl.disable(glow::BLEND);
            self.gl.use_program(Self::native_program(program));
            self.gl.active_texture(glow::TEXTURE0);
            self.gl
                .bind_texture(glow::TEXTURE_2D, Self::native_texture(texture));
            self.gl.uniform_1_i32(sampler.as_ref(), 0);
            self.gl.bind_vertex_array(Some(self.fullscreen_vao));
            self.gl.draw_arrays(glow::TRIANGLES, 0, 3);
            self.gl.bind_vertex_array(None);
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) };
    }

    fn take_error(&mut self) -> Option<u32> {
        let mut first = None;
        // A lost context can keep reporting errors; bound the drain.
        for _ in 0..MAX_DRAINED_ERRORS {
            let code = unsafe { self.gl.get_error() };
            if code == glow::NO_ERROR {
                break;
            }
            first.get_or_insert(code);
        }
        first
    }
}

impl Drop for GlBackend {
    fn drop(&mut self) {
        unsafe { self.gl.delete_vertex_array(self.fullscreen_vao) };
    }
}
