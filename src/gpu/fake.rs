//! Recording CPU backend for pipeline tests.

use std::collections::HashMap;

use super::{FRAME_IMAGE_UNIT, GpuBackend, ProgramHandle, TextureHandle, WORKGROUP_SIZE, uniform};
use crate::error::RtError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTexture { width: u32, height: u32 },
    DeleteTexture(TextureHandle),
    BindImageUnit { unit: u32, texture: TextureHandle },
    UseProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    Uniform { program: ProgramHandle, name: String },
    Dispatch(u32, u32, u32),
    Barrier,
    ReadTexture(TextureHandle),
    DrawFullscreen { program: ProgramHandle, texture: TextureHandle },
    Viewport(u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Vec3([f32; 3]),
    Mat4([[f32; 4]; 4]),
    F32(f32),
}

struct FakeTexture {
    width: u32,
    height: u32,
    /// Contents visible to reads.
    texels: Vec<u8>,
    /// Compute writes not yet made visible by a barrier.
    pending: Option<Vec<u8>>,
}

/// Backend that simulates the compute program on the CPU.
///
/// A dispatch fills every 16x16 tile it covers (clipped to the texture)
/// with a colour derived from the pixel coordinate and the bound
/// `camera_position`, and leaves those writes pending until
/// `memory_barrier` publishes them.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Vec<Call>,
    pub uniforms: HashMap<(ProgramHandle, String), UniformValue>,
    pub fail_texture_creation: bool,
    pub inject_error: Option<u32>,
    textures: HashMap<TextureHandle, FakeTexture>,
    image_units: HashMap<u32, TextureHandle>,
    current_program: Option<ProgramHandle>,
    next_id: u32,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_program(&mut self) -> ProgramHandle {
        self.next_id += 1;
        ProgramHandle(self.next_id)
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn position_of(&self, wanted: &Call) -> Option<usize> {
        self.calls.iter().position(|c| c == wanted)
    }

    fn shade(&self, x: u32, y: u32) -> [u8; 4] {
        let camera = self.current_program.and_then(|p| {
            match self.uniforms.get(&(p, uniform::CAMERA_POSITION.to_string())) {
                Some(UniformValue::Vec3(v)) => Some(*v),
                _ => None,
            }
        });
        let [cx, cy, cz] = camera.unwrap_or([0.0; 3]);
        [
            (x % 251) as u8,
            (y % 251) as u8,
            ((cx + cy + cz) * 10.0).rem_euclid(256.0) as u8,
            255,
        ]
    }
}

impl GpuBackend for FakeBackend {
    fn create_texture(&mut self, width: u32, height: u32) -> Result<TextureHandle, RtError> {
        self.calls.push(Call::CreateTexture { width, height });
        if self.fail_texture_creation {
            return Err(RtError::new("gl-texture").with_arg("msg", "injected"));
        }
        self.next_id += 1;
        let handle = TextureHandle(self.next_id);
        self.textures.insert(
            handle,
            FakeTexture {
                width,
                height,
                texels: vec![0; width as usize * height as usize * 4],
                pending: None,
            },
        );
        Ok(handle)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.calls.push(Call::DeleteTexture(texture));
        self.textures.remove(&texture);
        self.image_units.retain(|_, t| *t != texture);
    }

    fn bind_image_unit(&mut self, unit: u32, texture: TextureHandle) {
        self.calls.push(Call::BindImageUnit { unit, texture });
        self.image_units.insert(unit, texture);
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::UseProgram(program));
        self.current_program = Some(program);
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::DeleteProgram(program));
    }

    fn set_uniform_vec3(&mut self, program: ProgramHandle, name: &str, value: &[f32; 3]) {
        self.calls.push(Call::Uniform { program, name: name.to_string() });
        self.uniforms
            .insert((program, name.to_string()), UniformValue::Vec3(*value));
    }

    fn set_uniform_mat4(&mut self, program: ProgramHandle, name: &str, value: &[[f32; 4]; 4]) {
        self.calls.push(Call::Uniform { program, name: name.to_string() });
        self.uniforms
            .insert((program, name.to_string()), UniformValue::Mat4(*value));
    }

    fn set_uniform_f32(&mut self, program: ProgramHandle, name: &str, value: f32) {
        self.calls.push(Call::Uniform { program, name: name.to_string() });
        self.uniforms
            .insert((program, name.to_string()), UniformValue::F32(value));
    }

    fn dispatch_compute(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) {
        self.calls.push(Call::Dispatch(groups_x, groups_y, groups_z));
        let Some(handle) = self.image_units.get(&FRAME_IMAGE_UNIT).copied() else {
            return;
        };
        let Some((width, height, mut texels)) = self
            .textures
            .get(&handle)
            .map(|t| (t.width, t.height, t.pending.clone().unwrap_or_else(|| t.texels.clone())))
        else {
            return;
        };

        let cover_x = (groups_x * WORKGROUP_SIZE).min(width);
        let cover_y = (groups_y * WORKGROUP_SIZE).min(height);
        if groups_z > 0 {
            for y in 0..cover_y {
                for x in 0..cover_x {
                    let i = (y * width + x) as usize * 4;
                    texels[i..i + 4].copy_from_slice(&self.shade(x, y));
                }
            }
        }
        if let Some(texture) = self.textures.get_mut(&handle) {
            texture.pending = Some(texels);
        }
    }

    fn memory_barrier(&mut self) {
        self.calls.push(Call::Barrier);
        for texture in self.textures.values_mut() {
            if let Some(pending) = texture.pending.take() {
                texture.texels = pending;
            }
        }
    }

    fn read_texture(&mut self, texture: TextureHandle, out: &mut [u8]) {
        self.calls.push(Call::ReadTexture(texture));
        if let Some(t) = self.textures.get(&texture) {
            let n = out.len().min(t.texels.len());
            out[..n].copy_from_slice(&t.texels[..n]);
        }
    }

    fn draw_fullscreen(&mut self, program: ProgramHandle, texture: TextureHandle) {
        self.calls.push(Call::DrawFullscreen { program, texture });
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Viewport(width, height));
    }

    fn take_error(&mut self) -> Option<u32> {
        self.inject_error.take()
    }
}
