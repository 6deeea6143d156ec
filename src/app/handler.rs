use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::WindowId;

use crate::app::capture;
use crate::app::interactive::InteractiveSession;
use crate::app::mode::Mode;
use crate::error::RtError;
use crate::settings::Settings;

/// Drives the selected mode from the winit event loop.
///
/// Everything runs on the event-loop thread, which owns the GL context.
pub struct AppHandler {
    mode: Mode,
    settings: Settings,
    session: Option<InteractiveSession>,
    started: bool,
    failure: Option<RtError>,
}

impl AppHandler {
    pub fn new(mode: Mode, settings: Settings) -> Self {
        Self {
            mode,
            settings,
            session: None,
            started: false,
            failure: None,
        }
    }

    /// The fatal error that stopped the loop, if any.
    pub fn into_failure(self) -> Option<RtError> {
        self.failure
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RtError) {
        self.failure = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        match self.mode.clone() {
            Mode::Capture { output } => {
                log::info!("Headless capture to {}", output.display());
                let result = capture::run(event_loop, &self.settings, &output);
                match result {
                    Ok(()) => event_loop.exit(),
                    Err(e) => self.fail(event_loop, e),
                }
            }
            Mode::Interactive => {
                log::info!("Interactive mode");
                match InteractiveSession::new(event_loop, &self.settings) {
                    Ok(session) => self.session = Some(session),
                    Err(e) => self.fail(event_loop, e),
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(session) = &mut self.session {
            let response = session.handle_event(&event);
            if response.exit {
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if event_loop.exiting() {
            return;
        }
        if let Some(session) = &mut self.session {
            session.frame();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut session) = self.session.take() {
            session.release();
        }
    }
}
