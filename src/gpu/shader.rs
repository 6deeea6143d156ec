use std::path::Path;

use glow::HasContext;

use super::ProgramHandle;
use super::gl::GlBackend;
use crate::error::RtError;

fn read_source(path: &Path) -> Result<String, RtError> {
    std::fs::read_to_string(path).map_err(|e| {
        RtError::new("shader-read")
            .with_arg("path", path.display())
            .push_std(e)
    })
}

impl GlBackend {
    /// Compile and link a compute program from the GLSL file at `path`.
    pub fn compile_compute(&mut self, path: &Path) -> Result<ProgramHandle, RtError> {
        let source = read_source(path)?;
        self.link_program(&[(glow::COMPUTE_SHADER, source.as_str(), path)])
    }

    /// Compile and link the vertex + fragment program that presents the frame.
    pub fn compile_present(&mut self, vertex: &Path, fragment: &Path) -> Result<ProgramHandle, RtError> {
        let vertex_source = read_source(vertex)?;
        let fragment_source = read_source(fragment)?;
        self.link_program(&[
            (glow::VERTEX_SHADER, vertex_source.as_str(), vertex),
            (glow::FRAGMENT_SHADER, fragment_source.as_str(), fragment),
        ])
    }

    fn link_program(&mut self, stages: &[(u32, &str, &Path)]) -> Result<ProgramHandle, RtError> {
        let gl = &self.gl;
        unsafe {
            let program = gl
                .create_program()
                .map_err(|msg| RtError::new("gl-program").with_arg("msg", msg))?;

            let mut shaders = Vec::with_capacity(stages.len());
            for &(stage, source, path) in stages {
                let shader = match gl.create_shader(stage) {
                    Ok(shader) => shader,
                    Err(msg) => {
                        cleanup(gl, program, &shaders);
                        return Err(RtError::new("gl-shader").with_arg("msg", msg));
                    }
                };
                gl.shader_source(shader, source);
                gl.compile_shader(shader);
                if !gl.get_shader_compile_status(shader) {
                    let info = gl.get_shader_info_log(shader);
                    gl.delete_shader(shader);
                    cleanup(gl, program, &shaders);
                    return Err(RtError::new("gl-compile")
                        .with_arg("path", path.display())
                        .with_arg("log", info.trim()));
                }
                gl.attach_shader(program, shader);
                shaders.push(shader);
            }

            gl.link_program(program);
            let linked = gl.get_program_link_status(program);
            let info = gl.get_program_info_log(program);

            for &shader in &shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }

            if !linked {
                gl.delete_program(program);
                let paths: Vec<String> = stages.iter().map(|s| s.2.display().to_string()).collect();
                return Err(RtError::new("gl-link")
                    .with_arg("paths", paths.join(", "))
                    .with_arg("log", info.trim()));
            }
            if !info.trim().is_empty() {
                log::debug!("link log: {}", info.trim());
            }

            let handle = Self::program_handle(program);
            log::info!("Linked program {} from {} stage(s)", handle.0, stages.len());
            Ok(handle)
        }
    }
}

unsafe fn cleanup(gl: &glow::Context, program: glow::NativeProgram, shaders: &[glow::NativeShader]) {
    unsafe {
        for &shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        gl.delete_program(program);
    }
}
