use winit::event_loop::{ControlFlow, EventLoop};

mod app;
mod camera;
mod error;
mod gpu;
mod image_out;
mod input;
mod logging;
mod pipeline;
mod settings;

use crate::app::{AppHandler, Mode};
use crate::error::RtError;
use crate::logging::init_logging;
use crate::settings::Settings;

pub const CONFY_APP_NAME: &str = "compute-raytracer";

fn run() -> Result<(), RtError> {
    let settings = Settings::load();
    let mode = Mode::from_args(std::env::args().skip(1), &settings.capture.default_output);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = AppHandler::new(mode, settings);
    event_loop.run_app(&mut handler)?;

    match handler.into_failure() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        log::error!("Fatal: {e}");
        std::process::exit(-1);
    }
}
