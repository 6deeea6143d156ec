use std::num::NonZeroU32;

use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow as _};
use raw_window_handle::HasWindowHandle;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use crate::error::RtError;

/// A window with a current OpenGL context and its default framebuffer.
///
/// The context stays current on the creating thread for the whole session.
pub struct GlWindow {
    // Dropped in declaration order: surface and context before the window.
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    pub window: Window,
}

impl GlWindow {
    /// Create the window, make a GL 4.3 core context current on it and load
    /// the GL entry points.
    pub fn new(
        event_loop: &ActiveEventLoop,
        attributes: WindowAttributes,
        vsync: bool,
    ) -> Result<(Self, glow::Context), RtError> {
        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, pick_config)
            .map_err(|e| RtError::new("gl-display").with_arg("msg", e))?;
        let window = window.ok_or_else(|| RtError::new("window-create"))?;

        let display = config.display();
        let raw_handle = window.window_handle()?.as_raw();
        let context_attributes = ContextAttributesBuilder::new()
            // Compute shaders and image load/store need 4.3.
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_handle));
        let not_current = unsafe { display.create_context(&config, &context_attributes) }
            .map_err(|e| RtError::new("gl-context").with_arg("version", "4.3 core").push_std(e))?;

        let surface_attributes = window.build_surface_attributes(SurfaceAttributesBuilder::default())?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }?;
        let context = not_current.make_current(&surface)?;

        let interval = if vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("Failed to set swap interval: {e}");
        }

        let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };

        log::debug!(
            "GL config: {} samples, alpha {}",
            config.num_samples(),
            config.alpha_size()
        );

        Ok((
            Self {
                surface,
                context,
                window,
            },
            gl,
        ))
    }

    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, w, h);
        }
    }

    pub fn swap_buffers(&self) -> Result<(), RtError> {
        self.surface.swap_buffers(&self.context)?;
        Ok(())
    }
}

// The frame is a single full-screen blit; prefer the fewest samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    // glutin's `find_configs` fails with `BadConfig` when no native config
    // matches, and glutin-winit only calls the picker once it succeeded. The
    // template asks for no transparency, so no config is filtered out after.
    configs
        .min_by_key(|config| config.num_samples())
        .expect("glutin-winit passes a non-empty config iterator")
}
